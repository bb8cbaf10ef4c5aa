//! Configuration for the demo host
//!
//! Sources, later wins:
//! 1. Built-in defaults
//! 2. `tickflow.toml` in the working directory, or the file given with
//!    `--config` / `TICKFLOW_CONFIG_PATH` (which must exist)
//! 3. `TICKFLOW__<SECTION>__<KEY>` environment variables, after loading `.env`
//!
//! ```toml
//! seed = 7
//!
//! [scene]
//! width = 1024
//! height = 768
//!
//! [frames]
//! count = 300
//! realtime = true
//! ```

use anyhow::{bail, Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TICKFLOW_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scene: SceneConfig,
    pub spawn: SpawnConfig,
    pub frames: FrameConfig,
    pub script: ScriptConfig,
    /// Seed for spawn cadence and script randomness
    pub seed: u64,
}

/// The visible area; cats outside it stretched by `margin` are dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between batches
    pub interval: f64,
    pub batch_min: u32,
    pub batch_max: u32,
    /// How far below the bottom edge new cats start
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Seconds per frame, as seen by `DeltaTime()`
    pub dt: f64,
    pub count: u32,
    /// Pace frames with the wall clock instead of running flat out
    pub realtime: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub path: PathBuf,
    pub function: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scene: SceneConfig::default(),
            spawn: SpawnConfig::default(),
            frames: FrameConfig::default(),
            script: ScriptConfig::default(),
            seed: 42,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            width: 800.0,
            height: 600.0,
            margin: 100.0,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            interval: 0.2,
            batch_min: 2,
            batch_max: 5,
            offset: 80.0,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            dt: 1.0 / 60.0,
            count: 600,
            realtime: false,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            path: PathBuf::from("scripts/cats.tks"),
            function: "UpdateCat".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load with the default search
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn validate(&self) -> Result<()> {
        let scene = &self.scene;
        for (name, value) in [
            ("scene.width", scene.width),
            ("scene.height", scene.height),
            ("scene.margin", scene.margin),
            ("spawn.interval", self.spawn.interval),
            ("spawn.offset", self.spawn.offset),
            ("frames.dt", self.frames.dt),
        ] {
            if !value.is_finite() {
                bail!("{} must be a finite number, got {}", name, value);
            }
        }
        if scene.width <= 0.0 || scene.height <= 0.0 {
            bail!("scene must have a positive size, got {}x{}", scene.width, scene.height);
        }
        if scene.margin < 0.0 {
            bail!("scene.margin must not be negative");
        }

        let spawn = &self.spawn;
        if spawn.interval <= 0.0 {
            bail!("spawn.interval must be positive");
        }
        if spawn.batch_min > spawn.batch_max {
            bail!(
                "spawn.batch_min ({}) is larger than spawn.batch_max ({})",
                spawn.batch_min,
                spawn.batch_max
            );
        }
        if spawn.offset < 0.0 || spawn.offset >= scene.margin {
            bail!(
                "spawn.offset ({}) must lie inside the scene margin ({})",
                spawn.offset,
                scene.margin
            );
        }

        if self.frames.dt <= 0.0 {
            bail!("frames.dt must be positive");
        }
        if self.script.function.is_empty() {
            bail!("script.function must not be empty");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    dotenv: bool,
    env: Option<HashMap<String, String>>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder {
            config_path: None,
            dotenv: true,
            env: None,
        }
    }
}

impl ConfigBuilder {
    /// Explicit config file (overrides the default search)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Whether to load `.env` first
    pub fn dotenv(mut self, load: bool) -> Self {
        self.dotenv = load;
        self
    }

    /// Read overrides from `vars` instead of the process environment
    pub fn env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.dotenv {
            dotenvy::dotenv().ok();
        }

        let path = self
            .config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let defaults = config::Config::try_from(&Config::default())
            .context("Failed to build default configuration")?;
        let mut builder = config::Config::builder().add_source(defaults);
        builder = match &path {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::with_name("tickflow").required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix("TICKFLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(self.env),
        );

        let config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| match &path {
                Some(path) => format!("Failed to load configuration from {}", path.display()),
                None => "Failed to load configuration".to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }
}
