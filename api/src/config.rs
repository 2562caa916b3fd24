//! Configuration loading
//!
//! Layers, lowest priority first:
//! 1. Built-in defaults for the detected environment
//! 2. An optional `config.<environment>` file (TOML, YAML or JSON)
//! 3. `APP__`-prefixed environment variables, e.g. `APP__AUTH__JWT__SECRET`

use config::{Config, ConfigError, Environment as EnvSource, File};
use ks_shared::{AppConfig, Environment};

const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

/// Load configuration for the environment named by `ENVIRONMENT`/`ENV`/`RUST_ENV`
pub fn load() -> Result<AppConfig, ConfigError> {
    load_for(Environment::from_env())
}

/// Load configuration for a specific environment
pub fn load_for(environment: Environment) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::for_environment(environment);

    let settings = Config::builder()
        .add_source(Config::try_from(&defaults)?)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    config.environment = environment;
    Ok(config)
}
