//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the chosen front-end.
//! No business logic here.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wa_sync::adapters::ipc::StdioServer;
use wa_sync::adapters::mock::MockPrinter;
use wa_sync::adapters::openwa::session;
use wa_sync::adapters::printing::system_printer;
use wa_sync::adapters::shell::SystemOpener;
use wa_sync::adapters::ui::progress::spinner;
use wa_sync::adapters::ui::tui::TuiInputPort;
use wa_sync::ports::{FolderOpener, InputPort, PrinterPort, WaGateway};
use wa_sync::shared::config::AppConfig;
use wa_sync::usecases::{ChatService, CommandHandler, DownloadService, PrintService, WatcherService};

#[derive(Parser)]
#[command(name = "wa-sync", version, about = "Download WhatsApp media and print PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Interactive terminal menu (default).
    Menu,
    /// JSON lines on stdin/stdout for a windowed front-end.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mode = cli.command.unwrap_or(Mode::Menu);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    // stdout carries the menu or the IPC protocol; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    if mode == Mode::Menu {
        wa_sync::adapters::ui::init_ui();
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be loaded, using defaults");
        AppConfig::default()
    });
    let api_url = cfg.api_url_or_default();

    // --- Session: nothing is built until the automation library reports CONNECTED ---
    let pb = (mode == Mode::Menu).then(|| spinner(format!("Connecting to WhatsApp at {}...", api_url)));
    let connected = session::connect(&api_url, cfg.api_key(), cfg.connect_timeout()).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let wa: Arc<dyn WaGateway> = match connected {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!(url = %api_url, error = %e, "WhatsApp session unavailable");
            anyhow::bail!("{} (is the automation library running at {}?)", e, api_url);
        }
    };

    // --- Printing ---
    let printer: Arc<dyn PrinterPort> = if cfg.is_print_dry_run() {
        warn!("WA_SYNC_PRINT_DRY_RUN set, print jobs are only logged");
        Arc::new(MockPrinter::new())
    } else {
        system_printer(&cfg.sumatra_path_or_default())
    };
    let opener: Arc<dyn FolderOpener> = Arc::new(SystemOpener);

    // --- Services ---
    let downloads_dir = cfg.downloads_dir_or_default();
    info!(downloads_dir = %downloads_dir.display(), "download root");
    let chats = Arc::new(ChatService::new(
        Arc::clone(&wa),
        cfg.preview_images_or_default(),
    ));
    let downloads = Arc::new(DownloadService::new(Arc::clone(&wa), downloads_dir));
    let printing = Arc::new(PrintService::new(printer));

    let input_port: Arc<dyn InputPort> = match mode {
        Mode::Menu => Arc::new(TuiInputPort::new(
            chats,
            downloads,
            printing,
            opener,
            cfg.chats_page_size_or_default(),
        )),
        Mode::Serve => {
            let watcher = Arc::new(WatcherService::new(
                Arc::clone(&wa),
                cfg.watcher_poll_interval(),
            ));
            let background = Arc::clone(&watcher);
            tokio::spawn(async move {
                if let Err(e) = background.run_loop().await {
                    error!(error = %e, "watcher stopped");
                }
            });
            let handler = Arc::new(CommandHandler::new(chats, downloads, printing, opener));
            Arc::new(StdioServer::new(handler, watcher))
        }
    };

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
