//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_service;
pub mod commands;
pub mod download_service;
pub mod print_service;
pub mod watcher_service;

pub use chat_service::ChatService;
pub use commands::{Command, CommandHandler, Response};
pub use download_service::DownloadService;
pub use print_service::PrintService;
pub use watcher_service::WatcherService;
