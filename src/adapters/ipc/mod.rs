//! Line-delimited JSON protocol for a windowed front-end spawning this process.

pub mod stdio;

pub use stdio::StdioServer;
