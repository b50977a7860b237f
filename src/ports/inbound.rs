//! Inbound port. Presentation adapters call into the application.

use crate::domain::DomainError;

/// Input port: a presentation layer (terminal menu, IPC server) drives the use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run until the user exits or the input stream closes.
    async fn run(&self) -> Result<(), DomainError>;
}
