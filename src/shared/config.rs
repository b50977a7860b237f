//! Application configuration. Automation endpoint, paths, UI and print settings.
//!
//! Read from `WA_SYNC_*` environment variables (after `.env`), optionally layered
//! over a file named by `WA_SYNC_CONFIG`. Environment wins over the file.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8002";
pub const DEFAULT_DOWNLOADS_DIR: &str = "./downloads";
pub const DEFAULT_SUMATRA_PATH: &str = "SumatraPDF.exe";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Base URL of the automation library's easy API. Read from WA_SYNC_API_URL.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Sent as the `api_key` header when set. Read from WA_SYNC_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Root folder for downloads. Read from WA_SYNC_DOWNLOADS_DIR.
    #[serde(default)]
    pub downloads_dir: Option<String>,

    /// How long to wait for the session to report CONNECTED (default 60).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Seconds between new-message polls (default 5).
    #[serde(default)]
    pub watcher_poll_secs: Option<u64>,

    /// Decrypt image messages into inline previews when listing (default true).
    #[serde(default)]
    pub preview_images: Option<bool>,

    /// Chats per page in the terminal menu (default 10).
    #[serde(default)]
    pub chats_page_size: Option<usize>,

    /// SumatraPDF executable, Windows only.
    #[serde(default)]
    pub sumatra_path: Option<String>,

    /// Log print jobs instead of spooling them. Read from WA_SYNC_PRINT_DRY_RUN.
    #[serde(default)]
    pub print_dry_run: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let file = std::env::var("WA_SYNC_CONFIG").ok();
        Self::from_sources(file.as_deref())
    }

    fn from_sources(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        c = c.add_source(config::Environment::with_prefix("WA_SYNC").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    /// Returns the API key, treating an empty value as unset.
    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.is_empty())
    }

    pub fn downloads_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.downloads_dir.as_deref().unwrap_or(DEFAULT_DOWNLOADS_DIR))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(60))
    }

    /// Poll interval; never shorter than one second.
    pub fn watcher_poll_interval(&self) -> Duration {
        Duration::from_secs(self.watcher_poll_secs.unwrap_or(5).max(1))
    }

    pub fn preview_images_or_default(&self) -> bool {
        self.preview_images.unwrap_or(true)
    }

    pub fn chats_page_size_or_default(&self) -> usize {
        self.chats_page_size.filter(|n| *n > 0).unwrap_or(10)
    }

    pub fn sumatra_path_or_default(&self) -> String {
        self.sumatra_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMATRA_PATH.to_string())
    }

    pub fn is_print_dry_run(&self) -> bool {
        self.print_dry_run.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_url_or_default(), "http://localhost:8002");
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.downloads_dir_or_default(), PathBuf::from("./downloads"));
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.watcher_poll_interval(), Duration::from_secs(5));
        assert!(cfg.preview_images_or_default());
        assert_eq!(cfg.chats_page_size_or_default(), 10);
        assert_eq!(cfg.sumatra_path_or_default(), "SumatraPDF.exe");
        assert!(!cfg.is_print_dry_run());
    }

    #[test]
    fn test_normalizes_values() {
        let cfg = AppConfig {
            api_url: Some("http://wa:9000/".into()),
            api_key: Some(String::new()),
            watcher_poll_secs: Some(0),
            chats_page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.api_url_or_default(), "http://wa:9000");
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.watcher_poll_interval(), Duration::from_secs(1));
        assert_eq!(cfg.chats_page_size_or_default(), 10);
    }

    #[test]
    fn test_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wa-sync.toml");
        std::fs::write(
            &path,
            "api_url = \"http://files:1234\"\nchats_page_size = 5\npreview_images = false\n",
        )
        .unwrap();
        let cfg = AppConfig::from_sources(path.to_str()).unwrap();
        assert_eq!(cfg.api_url_or_default(), "http://files:1234");
        assert_eq!(cfg.chats_page_size_or_default(), 5);
        assert!(!cfg.preview_images_or_default());
    }
}
