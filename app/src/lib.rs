pub mod app;
pub mod cli;
pub mod config;
pub mod input;
pub mod services;

use config::AppConfig;

/// Load `.env`, then read configuration from the environment.
pub fn init_config() -> AppConfig {
    config::load_dotenv();

    let config = AppConfig::from_env();
    let warnings = config.check();
    if !warnings.is_empty() {
        tracing::warn!("Configuration warnings: {:?}", warnings);
    }

    tracing::info!(
        template = %config.template_path.display(),
        format = %config.output_format,
        "Settings loaded"
    );
    config
}
