//! wa-sync: WhatsApp media downloader and PDF printing helper with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
