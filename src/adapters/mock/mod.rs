//! In-memory adapters for tests and dry runs.

pub mod gateway;
pub mod printer;

pub use gateway::MockWaGateway;
pub use printer::MockPrinter;
