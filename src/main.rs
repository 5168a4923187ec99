use std::{env, io::BufRead, process::exit};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workflow_expr::{
    check_expression, config::CheckConfig, render_error, type_checker::type_checker::SemanticChecker,
    Position,
};

/// Checks expressions written without the surrounding ${{ }}. When no
/// expression is given, one expression per line is read from stdin.
#[derive(Parser)]
#[command(name = "workflow-expr")]
#[command(about = "Type checker for workflow ${{ }} expressions", long_about = None)]
#[command(version)]
struct Cli {
    /// Report potentially untrusted inputs
    #[arg(long)]
    untrusted: bool,
    /// Workflow key the expressions appear at, e.g. jobs.<job_id>.steps.run
    #[arg(long)]
    key: Option<String>,
    /// Line of the first expression character in the document
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    line: u32,
    /// Column of the first expression character in the document
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    column: u32,
    expressions: Vec<String>,
}

impl Cli {
    fn config(&self) -> CheckConfig {
        match &self.key {
            Some(key) => CheckConfig::for_workflow_key(key),
            None => CheckConfig::default(),
        }
        .with_untrusted_input_check(self.untrusted)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("WORKFLOW_EXPR_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let anchor = Position::new(cli.line as usize, cli.column as usize, 0);

    let mut expressions = cli.expressions;
    if expressions.is_empty() {
        expressions = std::io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .collect();
    }

    let mut failed = false;
    for expr in &expressions {
        let source = if expr.trim_end().ends_with("}}") {
            expr.clone()
        } else {
            format!("{} }}}}", expr)
        };

        let mut checker = SemanticChecker::with_config(&config);
        let result = check_expression(&source, anchor, &mut checker);

        match &result.ty {
            Some(ty) => println!("{}: {}", expr, ty),
            None => println!("{}: <error>", expr),
        }
        for error in &result.errors {
            failed = true;
            println!("{}:{}: {}", error.get_line(), error.get_column(), error.get_error_name());
            print!("{}", render_error(error, &source));
        }
    }

    if failed {
        exit(1);
    }
}
