use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use clap::Parser as ClapParser;
use log::{LevelFilter, info};
use serde::Deserialize;

use genex::{
    CompiledExpression, EvaluationContext, EvaluatorOptions, ParseError,
    memory::Project,
    model::{Makefile, Target},
};

/// Evaluate generator expressions against a project description.
#[derive(ClapParser)]
#[command(name = "genex", version)]
pub struct Arguments {
    /// Expressions to evaluate, e.g. '$<$<CONFIG:Debug>:-g>'
    #[arg(required = true)]
    expressions: Vec<String>,

    /// Active build configuration
    #[arg(short, long, default_value = "")]
    config: String,

    /// TOML file describing definitions, policies and targets
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Target the expressions are evaluated for
    #[arg(long)]
    head: Option<String>,

    /// Target owning the expression text (defaults to the head target)
    #[arg(long)]
    current: Option<String>,

    /// Record failures without printing diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Evaluate for consumption by the build system itself
    #[arg(long)]
    for_buildsystem: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The `[evaluator]` table of a project file. Every other key belongs to
/// the project itself.
#[derive(Deserialize)]
struct EvaluatorSection {
    #[serde(default)]
    evaluator: EvaluatorOptions,
}

fn load(path: &Path) -> Result<(Project, EvaluatorOptions)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let name = path.display().to_string();
    let project = Project::from_toml_str(&text, &name)?;
    let section: EvaluatorSection =
        toml::from_str(&text).with_context(|| format!("invalid [evaluator] table in '{name}'"))?;
    Ok((project, section.evaluator))
}

fn report_parse_error(input: &str, error: &ParseError) -> Result<()> {
    let id = "<expression>".to_string();
    let span = (id.clone(), error.span.clone());
    // Parser spans are byte offsets.
    Report::build(ReportKind::Error, span.clone())
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message("Failed to parse generator expression")
        .with_label(Label::new(span).with_message(&error.message))
        .finish()
        .eprint((id, Source::from(input)))?;
    Ok(())
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn find<'a>(project: &'a Project, name: Option<&str>) -> Result<Option<&'a dyn Target>> {
    name.map(|name| {
        project
            .find_target(name)
            .with_context(|| format!("no target named '{name}' in the project"))
    })
    .transpose()
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    // Diagnostics reach the terminal through the log facade.
    env_logger::Builder::new()
        .filter_level(level(args.verbose))
        .format_target(false)
        .parse_default_env()
        .init();

    let (project, mut options) = match &args.project {
        Some(path) => load(path)?,
        None => (Project::new(), EvaluatorOptions::default()),
    };
    options.quiet |= args.quiet;
    options.evaluate_for_buildsystem |= args.for_buildsystem;

    let head = find(&project, args.head.as_deref())?;
    let current = match args.current.as_deref() {
        Some(name) => find(&project, Some(name))?,
        None => head,
    };

    let mut failed = 0usize;
    for input in &args.expressions {
        let compiled = match CompiledExpression::parse(input) {
            Ok(compiled) => compiled,
            Err(error) => {
                report_parse_error(input, &error)?;
                failed += 1;
                continue;
            }
        };

        let context = EvaluationContext::new(&project, args.config.as_str())
            .with_options(&options)
            .with_targets(head, current);
        let outcome = compiled.evaluate_with(context, None);
        project.diagnostics().clear();

        if outcome.had_error {
            failed += 1;
            continue;
        }
        println!("{}", outcome.output);

        info!(
            "'{input}': context sensitive: {}, targets: {:?}, depends on: {:?}",
            outcome.had_context_sensitive_condition, outcome.all_targets, outcome.depend_targets
        );
        if !outcome.seen_target_properties.is_empty() {
            info!("'{input}': head properties read: {:?}", outcome.seen_target_properties);
        }
        for (target, standards) in &outcome.max_language_standard {
            info!("'{input}': {target} requires {standards:?}");
        }
    }

    if failed > 0 {
        bail!("{failed} of {} expression(s) failed to evaluate", args.expressions.len());
    }
    Ok(())
}
