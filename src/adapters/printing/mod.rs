//! Print spooler adapters. Implement PrinterPort.
//!
//! CUPS (`lp`/`lpstat`) on Unix, SumatraPDF on Windows. Map failures to DomainError::Print.

pub mod cups;
pub mod sumatra;

use crate::domain::DomainError;
use crate::ports::PrinterPort;
use std::process::Output;
use std::sync::Arc;
use tokio::process::Command;

pub use cups::CupsPrinter;
pub use sumatra::SumatraPrinter;

/// The spooler for the current platform.
pub fn system_printer(sumatra_path: &str) -> Arc<dyn PrinterPort> {
    if cfg!(windows) {
        Arc::new(SumatraPrinter::new(sumatra_path))
    } else {
        Arc::new(CupsPrinter::new())
    }
}

/// Run a spooler tool and return its output, failing on a non-zero exit.
async fn run(program: &str, args: &[String]) -> Result<Output, DomainError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| DomainError::Print(format!("spawn {}: {}", program, e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DomainError::Print(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}
