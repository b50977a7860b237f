//! Print jobs and the translation of logical print options into the key set
//! the spooler understands. Keys whose value equals the spooler default are omitted.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duplex {
    #[default]
    None,
    /// Flip on the long edge (portrait booklets).
    Long,
    /// Flip on the short edge.
    Short,
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Duplex::None => "none",
            Duplex::Long => "long",
            Duplex::Short => "short",
        })
    }
}

/// N-up layout. Accepts `2` or `"2"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "NupRepr", into = "u8")]
pub enum PagesPerSheet {
    #[default]
    One,
    Two,
    Four,
    Six,
    Nine,
}

impl PagesPerSheet {
    pub const ALL: [PagesPerSheet; 5] = [
        PagesPerSheet::One,
        PagesPerSheet::Two,
        PagesPerSheet::Four,
        PagesPerSheet::Six,
        PagesPerSheet::Nine,
    ];

    pub fn count(self) -> u8 {
        match self {
            PagesPerSheet::One => 1,
            PagesPerSheet::Two => 2,
            PagesPerSheet::Four => 4,
            PagesPerSheet::Six => 6,
            PagesPerSheet::Nine => 9,
        }
    }
}

impl fmt::Display for PagesPerSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

impl TryFrom<u64> for PagesPerSheet {
    type Error = String;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(PagesPerSheet::One),
            2 => Ok(PagesPerSheet::Two),
            4 => Ok(PagesPerSheet::Four),
            6 => Ok(PagesPerSheet::Six),
            9 => Ok(PagesPerSheet::Nine),
            other => Err(format!("pages per sheet must be 1, 2, 4, 6 or 9 (got {})", other)),
        }
    }
}

impl From<PagesPerSheet> for u8 {
    fn from(p: PagesPerSheet) -> Self {
        p.count()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NupRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<NupRepr> for PagesPerSheet {
    type Error = String;

    fn try_from(repr: NupRepr) -> Result<Self, Self::Error> {
        match repr {
            NupRepr::Number(n) => PagesPerSheet::try_from(n),
            NupRepr::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid pages per sheet: {:?}", s))
                .and_then(PagesPerSheet::try_from),
        }
    }
}

/// Logical per-file print options as chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub duplex: Duplex,
    pub color: bool,
    pub copies: u32,
    #[serde(alias = "nup")]
    pub pages_per_sheet: PagesPerSheet,
    /// Target printer. `None` or empty means the spooler default.
    pub printer: Option<String>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            duplex: Duplex::None,
            color: true,
            copies: 1,
            pages_per_sheet: PagesPerSheet::One,
            printer: None,
        }
    }
}

impl PrintOptions {
    /// Translate into spooler keys, dropping every key that equals its default.
    pub fn to_spool_options(&self) -> Result<SpoolOptions, DomainError> {
        if self.copies == 0 {
            return Err(DomainError::InvalidPrintOption(
                "copies must be at least 1".into(),
            ));
        }
        Ok(SpoolOptions {
            printer: self
                .printer
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
            duplex: (self.duplex != Duplex::None).then_some(self.duplex),
            monochrome: (!self.color).then_some(true),
            copies: (self.copies > 1).then_some(self.copies),
            pages_per_sheet: (self.pages_per_sheet != PagesPerSheet::One)
                .then(|| self.pages_per_sheet.count()),
        })
    }
}

/// One file to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub path: PathBuf,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub options: PrintOptions,
}

impl PrintJob {
    pub fn new(path: impl Into<PathBuf>, options: PrintOptions) -> Self {
        let path = path.into();
        let filename = path.file_name().map(|f| f.to_string_lossy().into_owned());
        Self {
            path,
            filename,
            options,
        }
    }
}

/// Spooler-facing option set. `None` means "leave at the spooler default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoolOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplex: Option<Duplex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monochrome: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copies: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_per_sheet: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_translate_to_empty_options() {
        let spool = PrintOptions::default().to_spool_options().unwrap();
        assert_eq!(spool, SpoolOptions::default());
        assert_eq!(serde_json::to_string(&spool).unwrap(), "{}");
    }

    #[test]
    fn test_non_defaults_are_kept() {
        let opts = PrintOptions {
            duplex: Duplex::Short,
            color: false,
            copies: 3,
            pages_per_sheet: PagesPerSheet::Four,
            printer: Some("Office_Laser".into()),
        };
        let json = serde_json::to_value(opts.to_spool_options().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "printer": "Office_Laser",
                "duplex": "short",
                "monochrome": true,
                "copies": 3,
                "pagesPerSheet": 4
            })
        );
    }

    #[test]
    fn test_blank_printer_is_default() {
        let opts = PrintOptions {
            printer: Some("  ".into()),
            ..PrintOptions::default()
        };
        assert_eq!(opts.to_spool_options().unwrap().printer, None);
    }

    #[test]
    fn test_zero_copies_rejected() {
        let opts = PrintOptions {
            copies: 0,
            ..PrintOptions::default()
        };
        assert!(matches!(
            opts.to_spool_options(),
            Err(DomainError::InvalidPrintOption(_))
        ));
    }

    #[test]
    fn test_job_deserializes_wire_shape() {
        let job: PrintJob = serde_json::from_str(
            r#"{"path":"/tmp/a.pdf","filename":"a.pdf",
                "options":{"duplex":"long","color":true,"copies":2,"nup":"6","printer":""}}"#,
        )
        .unwrap();
        assert_eq!(job.options.duplex, Duplex::Long);
        assert_eq!(job.options.copies, 2);
        assert_eq!(job.options.pages_per_sheet, PagesPerSheet::Six);

        let bare: PrintJob = serde_json::from_str(r#"{"path":"/tmp/b.pdf"}"#).unwrap();
        assert_eq!(bare.options, PrintOptions::default());
    }

    #[test]
    fn test_invalid_nup_rejected() {
        let res = serde_json::from_str::<PrintOptions>(r#"{"pagesPerSheet":3}"#);
        assert!(res.is_err());
        let res = serde_json::from_str::<PrintOptions>(r#"{"nup":"four"}"#);
        assert!(res.is_err());
    }
}
