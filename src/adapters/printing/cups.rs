//! CUPS spooler via the `lp` and `lpstat` command line tools.

use super::run;
use crate::domain::{DomainError, Duplex, Printer, SpoolOptions};
use crate::ports::PrinterPort;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

pub struct CupsPrinter {
    lp: String,
    lpstat: String,
}

impl CupsPrinter {
    pub fn new() -> Self {
        Self {
            lp: "lp".into(),
            lpstat: "lpstat".into(),
        }
    }
}

impl Default for CupsPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// `lp` arguments for one file. Unset options are left to the queue defaults.
pub fn lp_args(path: &Path, options: &SpoolOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(printer) = &options.printer {
        args.push("-d".into());
        args.push(printer.clone());
    }
    if let Some(copies) = options.copies {
        args.push("-n".into());
        args.push(copies.to_string());
    }
    match options.duplex {
        Some(Duplex::Long) => {
            args.push("-o".into());
            args.push("sides=two-sided-long-edge".into());
        }
        Some(Duplex::Short) => {
            args.push("-o".into());
            args.push("sides=two-sided-short-edge".into());
        }
        Some(Duplex::None) | None => {}
    }
    if options.monochrome == Some(true) {
        args.push("-o".into());
        args.push("print-color-mode=monochrome".into());
    }
    if let Some(n) = options.pages_per_sheet {
        args.push("-o".into());
        args.push(format!("number-up={}", n));
    }
    args.push("--".into());
    args.push(path.to_string_lossy().into_owned());
    args
}

/// `lpstat -e` prints one destination per line.
pub fn parse_destinations(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// `lpstat -d` prints `system default destination: NAME` or `no system default destination`.
pub fn parse_default(out: &str) -> Option<String> {
    out.lines()
        .find_map(|l| l.trim().split_once("default destination:"))
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[async_trait]
impl PrinterPort for CupsPrinter {
    async fn list_printers(&self) -> Result<Vec<Printer>, DomainError> {
        let names = run(&self.lpstat, &["-e".into()]).await?;
        let names = parse_destinations(&String::from_utf8_lossy(&names.stdout));
        // no default configured makes lpstat -d exit non-zero on some systems
        let default = match run(&self.lpstat, &["-d".into()]).await {
            Ok(out) => parse_default(&String::from_utf8_lossy(&out.stdout)),
            Err(e) => {
                debug!(error = %e, "no default printer");
                None
            }
        };
        Ok(names
            .into_iter()
            .map(|name| Printer {
                is_default: default.as_deref() == Some(name.as_str()),
                name,
            })
            .collect())
    }

    async fn print(&self, path: &Path, options: &SpoolOptions) -> Result<(), DomainError> {
        let args = lp_args(path, options);
        let out = run(&self.lp, &args).await?;
        info!(
            path = %path.display(),
            job = %String::from_utf8_lossy(&out.stdout).trim(),
            "submitted to CUPS"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lp_args_defaults() {
        let args = lp_args(Path::new("/tmp/a.pdf"), &SpoolOptions::default());
        assert_eq!(args, vec!["--", "/tmp/a.pdf"]);
    }

    #[test]
    fn test_lp_args_all_options() {
        let opts = SpoolOptions {
            printer: Some("HP_LaserJet".into()),
            duplex: Some(Duplex::Short),
            monochrome: Some(true),
            copies: Some(2),
            pages_per_sheet: Some(4),
        };
        let args = lp_args(Path::new("/tmp/a.pdf"), &opts);
        assert_eq!(
            args,
            vec![
                "-d",
                "HP_LaserJet",
                "-n",
                "2",
                "-o",
                "sides=two-sided-short-edge",
                "-o",
                "print-color-mode=monochrome",
                "-o",
                "number-up=4",
                "--",
                "/tmp/a.pdf"
            ]
        );
    }

    #[test]
    fn test_parse_lpstat() {
        assert_eq!(
            parse_destinations("HP_LaserJet\nPDF\n\n"),
            vec!["HP_LaserJet", "PDF"]
        );
        assert_eq!(
            parse_default("system default destination: PDF\n").as_deref(),
            Some("PDF")
        );
        assert_eq!(parse_default("no system default destination\n"), None);
    }
}
