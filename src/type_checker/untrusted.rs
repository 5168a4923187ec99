//! Detection of potentially untrusted inputs.
//!
//! Known-dangerous paths such as `github.event.issue.title` are stored in a
//! trie. [`UntrustedInputChecker`] follows property access chains through
//! that trie while the expression tree is left bottom-up, and reports every
//! chain that ends on a leaf.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;

use crate::{
    ast::{ast::Expr, visitor::Visitor},
    errors::errors::{quote_all, ExprError},
    Position, MK_ERROR,
};

/// Name of the child standing for any element of an array.
pub const ARRAY_ELEMENT: &str = "*";

pub type NodeId = usize;

#[derive(Debug)]
struct UntrustedInputNode {
    name: String,
    parent: Option<NodeId>,
    /// `None` for leaves, which are the untrusted values themselves.
    children: Option<BTreeMap<String, NodeId>>,
}

/// Immutable trie of untrusted input paths, rooted by context name.
#[derive(Debug, Default)]
pub struct UntrustedInputMap {
    nodes: Vec<UntrustedInputNode>,
    roots: HashMap<String, NodeId>,
}

impl UntrustedInputMap {
    /// Builds the trie from dotted paths. `*` stands for array elements.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut map = UntrustedInputMap::default();
        for path in paths {
            map.insert(path.as_ref());
        }
        map
    }

    fn insert(&mut self, path: &str) {
        let mut segments = path.split('.');
        let Some(root_name) = segments.next() else {
            return;
        };

        let mut cur = match self.roots.get(root_name) {
            Some(&id) => id,
            None => {
                let id = self.push(root_name, None);
                self.roots.insert(root_name.to_string(), id);
                id
            }
        };

        for segment in segments {
            cur = match self.child(cur, segment) {
                Some(id) => id,
                None => {
                    let id = self.push(segment, Some(cur));
                    self.nodes[cur]
                        .children
                        .get_or_insert_with(BTreeMap::new)
                        .insert(segment.to_string(), id);
                    id
                }
            };
        }
    }

    fn push(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(UntrustedInputNode {
            name: name.to_string(),
            parent,
            children: None,
        });
        self.nodes.len() - 1
    }

    pub fn root(&self, name: &str) -> Option<NodeId> {
        self.roots.get(name).copied()
    }

    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id].children.as_ref()?.get(name).copied()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id].children {
            Some(children) => children.values().copied().collect(),
            None => vec![],
        }
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_none()
    }

    /// Full dotted path of a node, e.g. `github.event.pages.*.page_name`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = vec![];
        let mut cur = Some(id);
        while let Some(id) = cur {
            names.push(self.nodes[id].name.as_str());
            cur = self.nodes[id].parent;
        }
        names.reverse();
        names.join(".")
    }
}

lazy_static! {
    pub static ref BUILTIN_UNTRUSTED_INPUTS: UntrustedInputMap = UntrustedInputMap::from_paths(&[
        "github.event.issue.title",
        "github.event.issue.body",
        "github.event.pull_request.title",
        "github.event.pull_request.body",
        "github.event.pull_request.head.ref",
        "github.event.pull_request.head.label",
        "github.event.pull_request.head.repo.default_branch",
        "github.event.comment.body",
        "github.event.review.body",
        "github.event.review_comment.body",
        "github.event.pages.*.page_name",
        "github.event.commits.*.message",
        "github.event.commits.*.author.email",
        "github.event.commits.*.author.name",
        "github.event.head_commit.message",
        "github.event.head_commit.author.email",
        "github.event.head_commit.author.name",
        "github.event.discussion.title",
        "github.event.discussion.body",
        "github.event.workflow_run.head_branch",
        "github.event.workflow_run.display_title",
        "github.event.workflow_run.head_commit.message",
        "github.event.workflow_run.head_commit.author.email",
        "github.event.workflow_run.head_commit.author.name",
        "github.event.workflow_run.pull_requests.*.head.ref",
        "github.head_ref",
    ]);
}

/// Visitor tracking property access chains through an [`UntrustedInputMap`].
///
/// It never reports type errors. Call [`UntrustedInputChecker::finish`]
/// after the traversal to flush the last chain.
pub struct UntrustedInputChecker<'a> {
    map: &'a UntrustedInputMap,
    cur: Vec<NodeId>,
    start: Option<Position>,
    filtering_object: bool,
    errors: Vec<ExprError>,
}

impl<'a> UntrustedInputChecker<'a> {
    pub fn new(map: &'a UntrustedInputMap) -> Self {
        UntrustedInputChecker {
            map,
            cur: vec![],
            start: None,
            filtering_object: false,
            errors: vec![],
        }
    }

    pub fn builtin() -> UntrustedInputChecker<'static> {
        UntrustedInputChecker::new(&BUILTIN_UNTRUSTED_INPUTS)
    }

    pub fn finish(&mut self) -> Vec<ExprError> {
        self.end();
        std::mem::take(&mut self.errors)
    }

    fn on_variable(&mut self, name: &str, position: Position) {
        self.end();
        if let Some(root) = self.map.root(name) {
            self.cur.push(root);
            self.start = Some(position);
        }
    }

    fn on_property_access(&mut self, name: &str) {
        let map = self.map;
        self.cur = self
            .cur
            .iter()
            .filter_map(|&id| map.child(id, name))
            .collect();
    }

    fn on_index_access(&mut self) {
        // `x.*.body[0]` picks from the filtered values, not from the trie
        if self.filtering_object {
            self.filtering_object = false;
            return;
        }
        let map = self.map;
        self.cur = self
            .cur
            .iter()
            .filter_map(|&id| map.child(id, ARRAY_ELEMENT))
            .collect();
    }

    fn on_object_filter(&mut self) {
        self.filtering_object = true;
        let map = self.map;
        self.cur = self
            .cur
            .iter()
            .flat_map(|&id| match map.child(id, ARRAY_ELEMENT) {
                Some(elem) => vec![elem],
                None => map.children(id),
            })
            .collect();
    }

    fn end(&mut self) {
        let mut paths: Vec<String> = self
            .cur
            .iter()
            .filter(|&&id| self.map.is_leaf(id))
            .map(|&id| self.map.path(id))
            .collect();

        if let Some(position) = self.start {
            match paths.len() {
                0 => {}
                1 => {
                    let path = paths.remove(0);
                    self.errors.push(MK_ERROR!(UntrustedInput { path }, position));
                }
                _ => {
                    paths.sort();
                    self.errors.push(MK_ERROR!(
                        UntrustedInputs {
                            paths: quote_all(&paths),
                        },
                        position
                    ));
                }
            }
        }

        self.cur.clear();
        self.start = None;
        self.filtering_object = false;
    }
}

impl Visitor for UntrustedInputChecker<'_> {
    fn leave(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable(v) => self.on_variable(&v.name, v.token.position),
            Expr::ObjectDeref(e) => self.on_property_access(&e.property),
            Expr::IndexAccess(e) => match e.index.as_ref() {
                Expr::String(s) => self.on_property_access(&s.value.to_lowercase()),
                _ => self.on_index_access(),
            },
            Expr::ArrayDeref(_) => self.on_object_filter(),
            _ => self.end(),
        }
    }
}
