//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod media;
pub mod print;

pub use entities::{
    Chat, DownloadProgress, DownloadResult, IncomingMessage, Message, MessageView, Printer,
    PrinterList, SavedFile, SingleDownload,
};
pub use errors::DomainError;
pub use media::DownloadKind;
pub use print::{Duplex, PagesPerSheet, PrintJob, PrintOptions, SpoolOptions};
