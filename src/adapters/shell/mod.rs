//! Desktop shell integration.

pub mod folder;

pub use folder::SystemOpener;
