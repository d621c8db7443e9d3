use crate::cli::Cli;
use crate::config::{CliOverrides, RegtestConfig, DEFAULT_CONFIG_FILE};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use regtest::CaptureFormat;
use std::path::Path;

impl CliOverrides {
    /// Collects the flags that were actually given.
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        let capture = if cli.pdf {
            Some(CaptureFormat::Pdf)
        } else {
            cli.capture.map(Into::into)
        };
        Self {
            interpreter: cli.interpreter.clone(),
            game: cli.game.clone(),
            port: cli.port,
            timeout: cli.timeout,
            verbose: cli.verbose.then_some(true),
            tests: cli.tests.clone(),
            capture,
            capture_path: cli.capture_path.clone(),
            root: cli.root.clone(),
            chrome: cli.chrome.clone(),
            headless: cli.visible.then_some(false),
        }
    }
}

impl RegtestConfig {
    /// Loads configuration for a command line.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// # Errors
    ///
    /// `NotFound` if `--config` names a missing file, `InvalidValue` if a
    /// layer cannot be parsed or the merged values are invalid.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_file = match &cli.config {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(path) => Some(path.clone()),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        Self::from_layers(config_file.as_deref(), &CliOverrides::from_cli(cli))
    }

    pub(crate) fn figment(config_file: Option<&Path>, overrides: &CliOverrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // REGTEST_PORT, REGTEST_CAPTURE_PATH, ...
        figment
            .merge(Env::prefixed("REGTEST_"))
            .merge(Serialized::defaults(overrides))
    }

    pub(crate) fn from_layers(config_file: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let config: Self = Self::figment(config_file, overrides)
            .extract()
            .map_err(|e| ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {DEFAULT_CONFIG_FILE} syntax and REGTEST_* variables"),
            })?;
        config.validate()?;
        Ok(config)
    }
}
