//! Print dispatcher. Submits jobs to the spooler one at a time, in order.
//!
//! The first failing job aborts the rest; jobs already submitted stay submitted.

use crate::domain::{DomainError, PrintJob, PrinterList};
use crate::ports::PrinterPort;
use std::sync::Arc;
use tracing::{error, info};

pub struct PrintService {
    printer: Arc<dyn PrinterPort>,
}

impl PrintService {
    pub fn new(printer: Arc<dyn PrinterPort>) -> Self {
        Self { printer }
    }

    /// Installed printers and the one to preselect: the flagged default,
    /// else the first printer, else empty.
    pub async fn get_printers(&self) -> Result<PrinterList, DomainError> {
        let printers = self.printer.list_printers().await?;
        let default = printers
            .iter()
            .find(|p| p.is_default)
            .or_else(|| printers.first())
            .map(|p| p.name.clone())
            .unwrap_or_default();
        Ok(PrinterList {
            printers: printers.into_iter().map(|p| p.name).collect(),
            default,
        })
    }

    /// Submit all jobs sequentially. Returns the number submitted.
    pub async fn print_all(&self, jobs: &[PrintJob]) -> Result<usize, DomainError> {
        for (index, job) in jobs.iter().enumerate() {
            let submitted = async {
                let options = job.options.to_spool_options()?;
                self.printer.print(&job.path, &options).await
            }
            .await;
            if let Err(e) = submitted {
                error!(index, path = %job.path.display(), error = %e, "print job failed; aborting batch");
                return Err(e);
            }
            info!(
                index,
                path = %job.path.display(),
                duplex = %job.options.duplex,
                copies = job.options.copies,
                "print job submitted"
            );
        }
        Ok(jobs.len())
    }
}
