//! Windows spooler via SumatraPDF's silent print mode.
//!
//! Printers are enumerated through PowerShell's `Win32_Printer` CIM class.

use super::run;
use crate::domain::{DomainError, Duplex, Printer, SpoolOptions};
use crate::ports::PrinterPort;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LIST_PRINTERS_PS: &str =
    "Get-CimInstance Win32_Printer | Select-Object Name,Default | ConvertTo-Json -Compress";

pub struct SumatraPrinter {
    exe: PathBuf,
}

impl SumatraPrinter {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

/// SumatraPDF arguments for one file. N-up is not supported by SumatraPDF.
pub fn sumatra_args(path: &Path, options: &SpoolOptions) -> Vec<String> {
    let mut args = Vec::new();
    match &options.printer {
        Some(printer) => {
            args.push("-print-to".into());
            args.push(printer.clone());
        }
        None => args.push("-print-to-default".into()),
    }

    let mut settings: Vec<String> = Vec::new();
    match options.duplex {
        Some(Duplex::Long) => settings.push("duplexlong".into()),
        Some(Duplex::Short) => settings.push("duplexshort".into()),
        Some(Duplex::None) | None => {}
    }
    if options.monochrome == Some(true) {
        settings.push("monochrome".into());
    }
    if let Some(copies) = options.copies {
        settings.push(format!("{}x", copies));
    }
    if !settings.is_empty() {
        args.push("-print-settings".into());
        args.push(settings.join(","));
    }

    args.push("-silent".into());
    args.push(path.to_string_lossy().into_owned());
    args
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CimPrinter {
    name: String,
    #[serde(default)]
    default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CimPrinters {
    Many(Vec<CimPrinter>),
    One(CimPrinter),
}

/// ConvertTo-Json emits a bare object for one printer and an array otherwise.
pub fn parse_printers(json: &str) -> Result<Vec<Printer>, DomainError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: CimPrinters = serde_json::from_str(json.trim())
        .map_err(|e| DomainError::Print(format!("unexpected printer list: {}", e)))?;
    let list = match parsed {
        CimPrinters::Many(v) => v,
        CimPrinters::One(p) => vec![p],
    };
    Ok(list
        .into_iter()
        .map(|p| Printer {
            name: p.name,
            is_default: p.default,
        })
        .collect())
}

#[async_trait]
impl PrinterPort for SumatraPrinter {
    async fn list_printers(&self) -> Result<Vec<Printer>, DomainError> {
        let out = run(
            "powershell",
            &[
                "-NoProfile".into(),
                "-Command".into(),
                LIST_PRINTERS_PS.into(),
            ],
        )
        .await?;
        parse_printers(&String::from_utf8_lossy(&out.stdout))
    }

    async fn print(&self, path: &Path, options: &SpoolOptions) -> Result<(), DomainError> {
        if let Some(n) = options.pages_per_sheet {
            warn!(pages_per_sheet = n, "SumatraPDF cannot print N-up; ignoring");
        }
        let args = sumatra_args(path, options);
        run(&self.exe.to_string_lossy(), &args).await?;
        info!(path = %path.display(), "submitted to SumatraPDF");
        Ok(())
    }
}
