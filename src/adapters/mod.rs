//! Infrastructure adapters. Implement ports.
//!
//! WhatsApp automation, print spooler, desktop shell, terminal menu, IPC. Map errors to DomainError.

pub mod ipc;
pub mod mock;
pub mod openwa;
pub mod printing;
pub mod shell;
pub mod ui;
