mod action;
mod app;
mod cli;
mod components;
mod error;
mod logging;
mod models;
mod setup;
mod store;

use std::path::PathBuf;

use color_eyre::eyre::Result;

use cli::Cli;
use models::ModelCatalog;
use setup::SetupController;
use store::{
    default_store_path, store_path_in, ConfigStore, FileMedium, MemoryMedium, StorageMedium,
    KEY_API_KEY, KEY_MODEL,
};

const LOG_FILE: &str = "eleven-setup.log";

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    if cli.ephemeral {
        // In-memory store; only log to a file if the user asked for one.
        let log_path = cli.log_file.clone();
        run(&cli, ConfigStore::new(MemoryMedium::new()), log_path)
    } else {
        let store_path = resolve_store_path(&cli)?;
        let log_path = cli
            .log_file
            .clone()
            .unwrap_or_else(|| store_path.with_file_name(LOG_FILE));
        run(
            &cli,
            ConfigStore::new(FileMedium::new(store_path)),
            Some(log_path),
        )
    }
}

fn resolve_store_path(cli: &Cli) -> error::Result<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(store_path_in(dir)),
        None => default_store_path(),
    }
}

fn run<M: StorageMedium>(
    cli: &Cli,
    mut store: ConfigStore<M>,
    log_path: Option<PathBuf>,
) -> Result<()> {
    // Headless paths first; neither needs a terminal or a runtime.
    if cli.reset {
        store.clear();
        println!("Stored configuration cleared.");
        return Ok(());
    }
    if cli.show {
        print_state(&store);
        return Ok(());
    }

    let _log_guard = match log_path {
        Some(path) => Some(logging::init(&path)?),
        None => None,
    };

    // The UI loop is synchronous; the runtime drives the controller's timers.
    let runtime = tokio::runtime::Runtime::new()?;
    let _enter = runtime.enter();

    let (controller, setup_events) = SetupController::new(store, ModelCatalog::new());
    let mut app = app::App::new(controller, setup_events)?;
    app.run()?;

    Ok(())
}

fn print_state<M: StorageMedium>(store: &ConfigStore<M>) {
    let catalog = ModelCatalog::new();

    match store.read::<String>(KEY_API_KEY) {
        Some(api_key) => println!("API key: {}", mask_key(&api_key)),
        None => println!("API key: (not set)"),
    }
    match store.read::<String>(KEY_MODEL) {
        Some(model) => match catalog.get(&model) {
            Some(info) => println!("Model:   {} ({})", model, info.label),
            None => println!("Model:   {}", model),
        },
        None => println!("Model:   (not set)"),
    }
}

/// Keep the first few characters for recognition, hide the rest
fn mask_key(key: &str) -> String {
    let total = key.chars().count();
    if total <= 4 {
        return "•".repeat(total);
    }
    let visible: String = key.chars().take(4).collect();
    format!("{visible}{}", "•".repeat(total - 4))
}
