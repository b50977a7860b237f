//! Mock printer. Records submitted jobs instead of spooling them.
//!
//! Used for tests and for `WA_SYNC_PRINT_DRY_RUN`.

use crate::domain::{DomainError, Printer, SpoolOptions};
use crate::ports::PrinterPort;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

pub struct MockPrinter {
    printers: Vec<Printer>,
    /// Zero-based submission index that fails.
    fail_at: Option<usize>,
    attempts: AtomicUsize,
    submitted: Mutex<Vec<(PathBuf, SpoolOptions)>>,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self {
            printers: vec![Printer {
                name: "Dry-Run".into(),
                is_default: true,
            }],
            fail_at: None,
            attempts: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_printers(mut self, printers: Vec<Printer>) -> Self {
        self.printers = printers;
        self
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Calls to `print`, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Jobs accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<(PathBuf, SpoolOptions)> {
        self.submitted
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PrinterPort for MockPrinter {
    async fn list_printers(&self) -> Result<Vec<Printer>, DomainError> {
        Ok(self.printers.clone())
    }

    async fn print(&self, path: &Path, options: &SpoolOptions) -> Result<(), DomainError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        let mut submitted = self
            .submitted
            .lock()
            .map_err(|e| DomainError::Print(e.to_string()))?;
        if self.fail_at == Some(attempt) {
            return Err(DomainError::Print(format!(
                "mock spooler rejected {}",
                path.display()
            )));
        }
        info!(path = %path.display(), ?options, "[DRY RUN] print job");
        submitted.push((path.to_path_buf(), options.clone()));
        Ok(())
    }
}
