//! Type system for expressions.
//!
//! This module defines the structural types values can have in an
//! expression:
//!
//! - Scalars (`null`, `bool`, `number`, `string`) and `any`
//! - Objects, which are strict, loose or uniformly mapped
//! - Arrays, remembering whether they came out of an object filter
//!
//! Types form a small algebra. [`ExprType::assignable`] decides whether a
//! value of one type may be used where another is expected, and
//! [`ExprType::merge`] finds the most specific type covering two branches.
//! Types are plain owned trees, so `clone()` is a deep copy.

use std::{collections::BTreeMap, fmt::Display};

#[derive(Debug, Clone, PartialEq)]
pub enum ExprType {
    /// Any value. Assignable from and to everything.
    Any,
    Null,
    Number,
    Bool,
    String,
    Object(ObjectType),
    Array(ArrayType),
}

/// What an object says about properties it does not list.
#[derive(Debug, Clone, PartialEq)]
pub enum PropsFallback {
    /// Only the listed properties exist.
    Strict,
    /// Unlisted properties exist and are `any`.
    Loose,
    /// Every property, listed or not, has this type. Never `Any`; that is
    /// spelled `Loose`.
    Mapped(Box<ExprType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub props: BTreeMap<String, ExprType>,
    pub fallback: PropsFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub elem: Box<ExprType>,
    /// Set when the array was produced by an object filter `.*`. A property
    /// access on such an array is applied to each element.
    pub deref: bool,
}

impl ObjectType {
    pub fn strict<S, I>(props: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, ExprType)>,
    {
        ObjectType {
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            fallback: PropsFallback::Strict,
        }
    }

    pub fn loose<S, I>(props: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, ExprType)>,
    {
        ObjectType {
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            fallback: PropsFallback::Loose,
        }
    }

    /// Object whose every property has type `ty`, like `env`.
    pub fn mapped(ty: ExprType) -> Self {
        ObjectType {
            props: BTreeMap::new(),
            fallback: PropsFallback::from_type(ty),
        }
    }

    pub fn empty_strict() -> Self {
        ObjectType::strict(Vec::<(String, ExprType)>::new())
    }

    pub fn empty_loose() -> Self {
        ObjectType::loose(Vec::<(String, ExprType)>::new())
    }

    pub fn is_strict(&self) -> bool {
        matches!(self.fallback, PropsFallback::Strict)
    }

    /// Type of unlisted properties, `None` for strict objects.
    pub fn fallback_type(&self) -> Option<ExprType> {
        match &self.fallback {
            PropsFallback::Strict => None,
            PropsFallback::Loose => Some(ExprType::Any),
            PropsFallback::Mapped(ty) => Some((**ty).clone()),
        }
    }

    /// Type of property `name`, falling back to the mapped type for
    /// unlisted properties.
    pub fn get_property_type(&self, name: &str) -> Option<ExprType> {
        match self.props.get(name) {
            Some(ty) => Some(ty.clone()),
            None => self.fallback_type(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: ExprType) {
        self.props.insert(name.into(), ty);
    }

    pub fn assignable(&self, other: &ObjectType) -> bool {
        match (&self.fallback, &other.fallback) {
            (PropsFallback::Strict, PropsFallback::Strict) => {
                other.props.iter().all(|(name, o)| {
                    self.props
                        .get(name)
                        .is_some_and(|ty| ty.assignable(o))
                })
            }
            (PropsFallback::Strict, _) => {
                let mapped = other.fallback_type().unwrap_or(ExprType::Any);
                self.props.values().all(|ty| ty.assignable(&mapped))
            }
            (_, PropsFallback::Strict) => {
                let mapped = self.fallback_type().unwrap_or(ExprType::Any);
                other.props.values().all(|o| mapped.assignable(o))
            }
            _ => {
                let mapped = self.fallback_type().unwrap_or(ExprType::Any);
                mapped.assignable(&other.fallback_type().unwrap_or(ExprType::Any))
            }
        }
    }

    pub fn merge(&self, other: &ObjectType) -> ObjectType {
        if self.is_strict() && self.props.is_empty() {
            return other.clone();
        }
        if other.is_strict() && other.props.is_empty() {
            return self.clone();
        }

        let mut props = self.props.clone();
        for (name, r) in &other.props {
            let merged = match props.get(name) {
                Some(l) => l.merge(r),
                None => r.clone(),
            };
            props.insert(name.clone(), merged);
        }

        let fallback = match (self.fallback_type(), other.fallback_type()) {
            (None, None) => PropsFallback::Strict,
            (Some(ty), None) | (None, Some(ty)) => PropsFallback::from_type(ty),
            (Some(l), Some(r)) => PropsFallback::from_type(l.merge(&r)),
        };

        ObjectType { props, fallback }
    }
}

impl PropsFallback {
    fn from_type(ty: ExprType) -> Self {
        match ty {
            ExprType::Any => PropsFallback::Loose,
            ty => PropsFallback::Mapped(Box::new(ty)),
        }
    }
}

impl ArrayType {
    pub fn new(elem: ExprType, deref: bool) -> Self {
        ArrayType {
            elem: Box::new(elem),
            deref,
        }
    }

    /// Merged arrays no longer come from a single filter chain, so `deref`
    /// is always cleared.
    pub fn merge(&self, other: &ArrayType) -> ArrayType {
        ArrayType::new(self.elem.merge(&other.elem), false)
    }
}

impl ExprType {
    pub fn array(elem: ExprType) -> Self {
        ExprType::Array(ArrayType::new(elem, false))
    }

    pub fn filtered_array(elem: ExprType) -> Self {
        ExprType::Array(ArrayType::new(elem, true))
    }

    pub fn strict_object<S, I>(props: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, ExprType)>,
    {
        ExprType::Object(ObjectType::strict(props))
    }

    pub fn loose_object() -> Self {
        ExprType::Object(ObjectType::empty_loose())
    }

    pub fn mapped_object(ty: ExprType) -> Self {
        ExprType::Object(ObjectType::mapped(ty))
    }

    /// Whether a value of type `other` can be used where `self` is expected.
    pub fn assignable(&self, other: &ExprType) -> bool {
        match (self, other) {
            (ExprType::Any, _) => true,
            (ExprType::Null, ExprType::Null | ExprType::Any) => true,
            (ExprType::Number, ExprType::Number | ExprType::Any) => true,
            // Any value can be coerced to bool
            (ExprType::Bool, _) => true,
            (ExprType::String, ExprType::String | ExprType::Number | ExprType::Any) => true,
            (ExprType::Object(_), ExprType::Any) => true,
            (ExprType::Object(l), ExprType::Object(r)) => l.assignable(r),
            (ExprType::Array(_), ExprType::Any) => true,
            (ExprType::Array(l), ExprType::Array(r)) => l.elem.assignable(&r.elem),
            _ => false,
        }
    }

    /// The most specific type covering both `self` and `other`.
    /// Incompatible pairs widen to `any`.
    pub fn merge(&self, other: &ExprType) -> ExprType {
        match (self, other) {
            (ExprType::Any, _) | (_, ExprType::Any) => ExprType::Any,
            (ExprType::Null, ExprType::Null) => ExprType::Null,
            (ExprType::Number, ExprType::Number) => ExprType::Number,
            (ExprType::Bool, ExprType::Bool) => ExprType::Bool,
            (ExprType::String, ExprType::String | ExprType::Number | ExprType::Bool)
            | (ExprType::Number | ExprType::Bool, ExprType::String) => ExprType::String,
            (ExprType::Object(l), ExprType::Object(r)) => ExprType::Object(l.merge(r)),
            (ExprType::Array(l), ExprType::Array(r)) => ExprType::Array(l.merge(r)),
            _ => ExprType::Any,
        }
    }

    /// Type of a JSON value, as produced by `fromJSON()` on a literal.
    pub fn from_json_value(value: &serde_json::Value) -> ExprType {
        match value {
            serde_json::Value::Null => ExprType::Null,
            serde_json::Value::Bool(_) => ExprType::Bool,
            serde_json::Value::Number(_) => ExprType::Number,
            serde_json::Value::String(_) => ExprType::String,
            serde_json::Value::Array(items) => {
                let elem = items
                    .iter()
                    .map(ExprType::from_json_value)
                    .reduce(|acc, ty| acc.merge(&ty))
                    .unwrap_or(ExprType::Any);
                ExprType::array(elem)
            }
            serde_json::Value::Object(map) => ExprType::strict_object(
                map.iter()
                    .map(|(k, v)| (k.to_lowercase(), ExprType::from_json_value(v))),
            ),
        }
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.props.is_empty() {
            return match &self.fallback {
                PropsFallback::Strict => write!(f, "{{}}"),
                PropsFallback::Loose => write!(f, "object"),
                PropsFallback::Mapped(ty) => write!(f, "{{string => {}}}", ty),
            };
        }

        write!(f, "{{")?;
        for (i, (name, ty)) in self.props.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        match self.fallback_type() {
            Some(ty) => write!(f, "; *: {}}}", ty),
            None => write!(f, "}}"),
        }
    }
}

impl Display for ExprType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprType::Any => write!(f, "any"),
            ExprType::Null => write!(f, "null"),
            ExprType::Number => write!(f, "number"),
            ExprType::Bool => write!(f, "bool"),
            ExprType::String => write!(f, "string"),
            ExprType::Object(object) => write!(f, "{}", object),
            ExprType::Array(array) => write!(f, "array<{}>", array.elem),
        }
    }
}
