//! Adapter for the WhatsApp automation library's HTTP easy API.

pub mod client;
pub mod mapper;
pub mod session;

pub use client::OpenWaGateway;
