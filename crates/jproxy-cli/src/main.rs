use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use jproxy_classpath::{ClassGraphFixture, ClassIndex, ClasspathEntry};
use jproxy_config::{ConfigDiagnostics, JproxyConfig};
use jproxy_plan::{
    CollisionScope, CppNameMapping, PlanError, PlanOptions, Planner, TypeKey, WrapPlan,
};

mod output;

#[derive(Parser)]
#[command(name = "jproxy", version, about = "Resolve Java4Cpp wrap plans from compiled classes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the wrap plan for the annotated classes (or the given roots)
    Plan(PlanArgs),
    /// Show the plan entry for one type
    Explain(ExplainArgs),
    /// Print the effective configuration and its diagnostics
    Config(ConfigArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Class directory or jar; repeatable, earlier entries shadow later ones
    #[arg(long = "classpath", value_name = "PATH")]
    classpath: Vec<PathBuf>,
    /// JSON class-graph fixture, consulted after the classpath
    #[arg(long, value_name = "JSON")]
    graph: Option<PathBuf>,
    /// Explicit root type (dotted binary name); defaults to every `@Java4Cpp` type
    #[arg(long = "root", value_name = "NAME")]
    roots: Vec<String>,
    #[command(flatten)]
    config: ConfigSource,
}

#[derive(Args)]
struct ConfigSource {
    /// Config file; skips discovery
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Project root used for config discovery
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

#[derive(Args)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Emit JSON suitable for an emitter
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExplainArgs {
    /// Dotted binary name of the type to show
    #[arg(value_name = "TYPE")]
    name: String,
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(flatten)]
    source: ConfigSource,
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            // Rejected input graphs are distinct from usage and I/O failures.
            if err.is::<PlanError>() {
                1
            } else {
                2
            }
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Plan(args) => {
            let config = load_config(&args.input.config)?;
            let plan = resolve(&args.input, &config)?;
            output::print_plan(&plan, args.json)?;
            Ok(0)
        }
        Command::Explain(args) => {
            let config = load_config(&args.input.config)?;
            let plan = resolve(&args.input, &config)?;
            let Some(descriptor) = plan.get_by_name(&args.name) else {
                bail!("`{}` is not part of the wrap plan", args.name);
            };
            output::print_explain(&plan, descriptor, args.json)?;
            Ok(0)
        }
        Command::Config(args) => {
            let (path, config, diagnostics) = read_config(&args.source)?;
            let report = ConfigReport {
                path,
                config,
                diagnostics,
            };
            output::print_config(&report, args.json)?;
            Ok(if report.diagnostics.is_ok() { 0 } else { 1 })
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ConfigReport {
    path: Option<PathBuf>,
    config: JproxyConfig,
    diagnostics: ConfigDiagnostics,
}

fn read_config(source: &ConfigSource) -> Result<(Option<PathBuf>, JproxyConfig, ConfigDiagnostics)> {
    match &source.config {
        Some(path) => {
            let (config, diagnostics) = JproxyConfig::load_from_path_with_diagnostics(path)?;
            Ok((Some(path.clone()), config, diagnostics))
        }
        None => {
            let (config, path, diagnostics) =
                jproxy_config::load_for_root_with_diagnostics(&source.path)?;
            Ok((path, config, diagnostics))
        }
    }
}

/// Loads the config, installs tracing and rejects configs with validation errors.
fn load_config(source: &ConfigSource) -> Result<JproxyConfig> {
    let (path, config, diagnostics) = read_config(source)?;
    jproxy_config::init_tracing(&config.logging);

    for key in &diagnostics.unknown_keys {
        tracing::warn!(target: "jproxy.config", key = %key, "unknown config key");
    }
    for warning in &diagnostics.warnings {
        tracing::warn!(target: "jproxy.config", "{warning}");
    }
    if !diagnostics.is_ok() {
        let errors: Vec<String> = diagnostics.errors.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    if let Some(path) = &path {
        tracing::debug!(target: "jproxy.config", path = %path.display(), "using config file");
    }
    Ok(config)
}

fn resolve(input: &InputArgs, config: &JproxyConfig) -> Result<WrapPlan> {
    let index = load_graph(&input.classpath, input.graph.as_deref())?;

    let mut naming = CppNameMapping::new()
        .with_suffix(config.naming.escape_suffix.clone())
        .with_reserved_words(config.naming.reserved_words.iter().cloned());
    for (java, native) in config.native_types() {
        naming = naming.with_native_type(java, native);
    }
    let options = PlanOptions {
        collision_scope: match config.naming.collision_scope {
            jproxy_config::CollisionScope::Plan => CollisionScope::Plan,
            jproxy_config::CollisionScope::Package => CollisionScope::Package,
            jproxy_config::CollisionScope::Enclosing => CollisionScope::Enclosing,
        },
    };

    let planner = Planner::new(&index, &naming).with_options(options);
    let plan = if input.roots.is_empty() {
        planner.resolve_annotated()?
    } else {
        let roots: Vec<TypeKey> = input.roots.iter().map(|name| planner.key(name)).collect();
        planner.resolve(&roots)?
    };
    Ok(plan)
}

fn load_graph(classpath: &[PathBuf], graph: Option<&Path>) -> Result<ClassIndex> {
    if classpath.is_empty() && graph.is_none() {
        bail!("nothing to plan: pass --classpath and/or --graph");
    }

    let entries: Vec<ClasspathEntry> = classpath.iter().map(ClasspathEntry::from_path).collect();
    for entry in &entries {
        if !entry.path().exists() {
            bail!("classpath entry {} does not exist", entry.path().display());
        }
    }
    let mut index = ClassIndex::build(&entries).context("failed to index classpath")?;

    if let Some(graph) = graph {
        let fixture = ClassGraphFixture::load(graph)
            .with_context(|| format!("failed to load class graph {}", graph.display()))?;
        for stub in fixture.classes {
            index.insert_if_absent(stub);
        }
    }
    tracing::info!(target: "jproxy.classpath", classes = index.len(), "class graph ready");
    Ok(index)
}
