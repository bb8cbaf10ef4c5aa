use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::coroutine::resolve_function;
use crate::demo::{CatState, Scene};
use crate::engine::{CompileError, Engine, ScriptModule};
use crate::parser::parse_script;
use crate::parser::semantic_validator::Validator;

#[derive(Parser)]
#[command(name = "tickflow")]
#[command(about = "tickflow - script coroutines stepped once per frame", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the headless cat scene
    Run {
        /// Script file (default: script.path from config)
        script: Option<PathBuf>,

        /// Function each cat runs
        #[arg(short = 'f', long = "function")]
        function: Option<String>,

        /// Number of frames to run
        #[arg(short = 'n', long = "frames")]
        frames: Option<u32>,

        /// RNG seed for spawns and Random()
        #[arg(long)]
        seed: Option<u64>,

        /// Pace frames with the wall clock
        #[arg(long)]
        realtime: bool,

        /// Print one JSON report per frame instead of logging it
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a script, printing every diagnostic
    Check {
        /// Script file
        script: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print a script's AST as JSON
    Dump {
        /// Script file
        script: PathBuf,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            script,
            function,
            frames,
            seed,
            realtime,
            json,
        } => {
            let mut config = Config::builder()
                .config_path(cli.config)
                .build()
                .context("Failed to load configuration")?;

            // Command-line flags win over every config source
            if let Some(script) = script {
                config.script.path = script;
            }
            if let Some(function) = function {
                config.script.function = function;
            }
            if let Some(frames) = frames {
                config.frames.count = frames;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.frames.realtime |= realtime;
            config.validate()?;

            run_scene(&config, json).await?;
        }

        Commands::Check {
            script,
            deny_warnings,
        } => {
            let validator = if deny_warnings {
                Validator::new().deny_warnings()
            } else {
                Validator::new()
            };
            check(&script, &validator)?
        }

        Commands::Dump { script } => {
            let module = load_module(&Engine::new(), &script)?;
            let dump = module.to_json().context("Failed to serialize module")?;
            println!("{}", dump);
        }
    }

    Ok(())
}

async fn run_scene(config: &Config, json: bool) -> Result<()> {
    let engine = Engine::new();
    let module = load_module(&engine, &config.script.path)?;

    // A bad function name would otherwise just spawn inert cats
    resolve_function(&module, &config.script.function, &CatState::default())
        .with_context(|| format!("Cannot run '{}'", config.script.function))?;

    info!(
        module = module.name(),
        version = module.short_version(),
        function = %config.script.function,
        frames = config.frames.count,
        seed = config.seed,
        "starting scene"
    );

    let mut scene = Scene::new(module, config)?;
    let mut ticker = config
        .frames
        .realtime
        .then(|| tokio::time::interval(Duration::from_secs_f64(config.frames.dt)));

    let mut spawned = 0;
    let mut peak = 0;
    for _ in 0..config.frames.count {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }

        let report = scene.frame();
        spawned += report.spawned;
        peak = peak.max(report.population);

        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            info!(
                frame = report.frame,
                population = report.population,
                spawned = report.spawned,
                removed = report.removed,
                "frame"
            );
        }
    }

    let stats = engine.stats();
    println!(
        "Ran {} frames: {} cats spawned, peak population {}, {} remaining ({} contexts created)",
        config.frames.count,
        spawned,
        peak,
        scene.population(),
        stats.contexts_created
    );
    Ok(())
}

fn check(path: &Path, validator: &Validator) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let script = parse_script(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let report = validator.check(&script, &source);
    for diagnostic in report.iter() {
        println!("{}: {}", path.display(), diagnostic);
    }

    if report.has_errors() {
        bail!("{} has {} error(s)", path.display(), report.errors.len());
    }

    println!(
        "✓ {} ({} function(s), {} warning(s))",
        path.display(),
        script.functions.len(),
        report.warnings.len()
    );
    Ok(())
}

fn load_module(engine: &Engine, path: &Path) -> Result<ScriptModule> {
    match engine.load_file(path) {
        Ok(module) => Ok(module),
        Err(CompileError::Validation { module, errors }) => {
            for error in &errors {
                eprintln!("{}: {}", path.display(), error);
            }
            bail!("module '{}' failed validation with {} error(s)", module, errors.len())
        }
        Err(e) => Err(e.into()),
    }
}
