use std::process::ExitCode;
use std::sync::Arc;

use image_processor::AssetCache;
use tracing_subscriber::EnvFilter;

use yells_at_lib::app::{self, App};
use yells_at_lib::cli::CliArgs;
use yells_at_lib::input::clipboard::SystemClipboard;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse_ordered();

    let mut config = yells_at_lib::init_config();
    args.apply_overrides(&mut config);

    let sources = args.sources();
    if sources.is_empty() {
        anyhow::bail!("Nothing to do: pass a file, `-`, --uri-list, --text or --paste");
    }

    let mode = args.output_mode(&config);
    let cache = Arc::new(AssetCache::new());
    let runner = App::new(&config, mode, SystemClipboard, cache);

    let reports = runner.run(sources, args.json).await;
    tracing::info!(interactions = reports.len(), "Done");

    if app::any_failed(&reports) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
