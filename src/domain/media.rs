//! Media classification rules: which MIME types belong to a download kind,
//! which extension a file gets, and how chat ids become path segments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory used for single-message downloads.
pub const INDIVIDUAL_DIR: &str = "individual";

/// Fallback extension when the MIME type carries no usable subtype.
const FALLBACK_EXT: &str = "bin";

/// Bulk download filter. The lowercase name is also the directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    Image,
    Pdf,
    Office,
}

impl DownloadKind {
    pub const ALL: [DownloadKind; 3] = [DownloadKind::Image, DownloadKind::Pdf, DownloadKind::Office];

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadKind::Image => "image",
            DownloadKind::Pdf => "pdf",
            DownloadKind::Office => "office",
        }
    }

    /// Substring predicate on the MIME type.
    pub fn matches(self, mimetype: &str) -> bool {
        match self {
            DownloadKind::Image => mimetype.contains("image"),
            DownloadKind::Pdf => mimetype.contains("pdf"),
            DownloadKind::Office => ["word", "excel", "presentation", "powerpoint", "officedocument"]
                .iter()
                .any(|needle| mimetype.contains(needle)),
        }
    }
}

impl fmt::Display for DownloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File extension for a MIME type. Office formats are normalized to their
/// OOXML extension regardless of the legacy subtype.
pub fn extension_for_mime(mimetype: &str) -> String {
    if mimetype.contains("presentation") || mimetype.contains("powerpoint") {
        return "pptx".into();
    }
    if mimetype.contains("sheet") || mimetype.contains("excel") {
        return "xlsx".into();
    }
    if mimetype.contains("word") {
        return "docx".into();
    }
    let subtype = mimetype
        .split_once('/')
        .map(|(_, sub)| sub.split(';').next().unwrap_or("").trim())
        .unwrap_or("");
    let valid = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'));
    if valid {
        subtype.to_string()
    } else {
        FALLBACK_EXT.into()
    }
}

/// Filesystem-safe path segment: every non-alphanumeric ASCII char becomes `_`.
pub fn sanitize_chat_id(chat_id: &str) -> String {
    chat_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Characters Windows rejects in file names, plus control characters.
fn is_reserved_in_filename(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// File name for a single-message download: `<filename-or-id>.<ext>`, without
/// reserved characters and without doubling an extension the filename already has.
pub fn single_download_name(filename: Option<&str>, message_id: &str, ext: &str) -> String {
    let stem = filename
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(message_id);
    let stem: String = stem
        .chars()
        .map(|c| if is_reserved_in_filename(c) { '_' } else { c })
        .collect();
    let suffix = format!(".{}", ext);
    if stem.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        stem
    } else {
        format!("{}{}", stem, suffix)
    }
}

/// Human readable size: "0 Bytes", "512 Bytes", "1.5 KB", "2.25 MB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        assert!(DownloadKind::Image.matches("image/jpeg"));
        assert!(DownloadKind::Pdf.matches("application/pdf"));
        assert!(!DownloadKind::Pdf.matches("image/png"));
        assert!(DownloadKind::Office.matches("application/msword"));
        assert!(DownloadKind::Office.matches("application/vnd.ms-excel"));
        assert!(DownloadKind::Office.matches("application/vnd.ms-powerpoint"));
        assert!(DownloadKind::Office.matches(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert!(!DownloadKind::Office.matches("application/pdf"));
    }

    #[test]
    fn test_office_extensions() {
        assert_eq!(
            extension_for_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            "docx"
        );
        assert_eq!(extension_for_mime("application/msword"), "docx");
        assert_eq!(extension_for_mime("application/vnd.ms-excel"), "xlsx");
        assert_eq!(
            extension_for_mime("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            "xlsx"
        );
        assert_eq!(
            extension_for_mime(
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            ),
            "pptx"
        );
        assert_eq!(extension_for_mime("application/vnd.ms-powerpoint"), "pptx");
    }

    #[test]
    fn test_plain_extensions() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpeg");
        assert_eq!(extension_for_mime("application/pdf"), "pdf");
        assert_eq!(extension_for_mime("audio/ogg; codecs=opus"), "ogg");
        assert_eq!(extension_for_mime("weird"), "bin");
        assert_eq!(extension_for_mime("image/"), "bin");
        assert_eq!(extension_for_mime(""), "bin");
    }

    #[test]
    fn test_sanitize_chat_id() {
        assert_eq!(sanitize_chat_id("12345@c.us"), "12345_c_us");
        assert_eq!(sanitize_chat_id("1203630-4567@g.us"), "1203630_4567_g_us");
        let once = sanitize_chat_id("a.b@c");
        assert_eq!(sanitize_chat_id(&once), once);
        assert_ne!(sanitize_chat_id("111@c.us"), sanitize_chat_id("112@c.us"));
        assert_ne!(sanitize_chat_id("abc@c.us"), sanitize_chat_id("abd@c.us"));
    }

    #[test]
    fn test_single_download_name() {
        assert_eq!(single_download_name(Some("report.pdf"), "m1", "pdf"), "report.pdf");
        assert_eq!(single_download_name(Some("Scan.PDF"), "m1", "pdf"), "Scan.PDF");
        assert_eq!(single_download_name(Some("notes"), "m1", "pdf"), "notes.pdf");
        assert_eq!(single_download_name(None, "true_1@c.us_ABC", "jpeg"), "true_1@c.us_ABC.jpeg");
        assert_eq!(single_download_name(Some("../x/y"), "m1", "pdf"), ".._x_y.pdf");
        assert_eq!(single_download_name(Some("  "), "m1", "bin"), "m1.bin");
        assert_eq!(
            single_download_name(Some("Q3 <draft>: \"final\"?*|.pdf"), "m1", "pdf"),
            "Q3 _draft__ _final____.pdf"
        );
        assert_eq!(single_download_name(Some("a\tb"), "m1", "txt"), "a_b.txt");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
    }
}
