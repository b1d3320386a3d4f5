use clap::Parser;
use codelens::core::{config, session::SessionStore};
use codelens::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "codelens", about = "Ask questions about a GitHub repository")]
struct Args {
    /// Backend base URL (overrides config and CODELENS_BACKEND_URL)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Named session whose chat history is restored and saved
    #[arg(short, long)]
    session: Option<String>,

    /// Discard the session's saved chat history before starting
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to codelens.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("codelens.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        config::CodelensConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        args.backend_url.as_deref(),
        args.session.as_deref(),
    );

    log::info!(
        "CodeLens starting up: backend={}, session={}",
        resolved.backend_url,
        resolved.session
    );

    let store = SessionStore::named(&resolved.session)?;
    if args.fresh {
        log::info!("Clearing saved session {}", store.path().display());
        store.clear()?;
    }

    tui::run(resolved, store)
}
