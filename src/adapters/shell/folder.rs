//! Implements FolderOpener with the platform file browser (`open` crate).

use crate::domain::DomainError;
use crate::ports::FolderOpener;
use std::path::Path;
use tracing::info;

pub struct SystemOpener;

impl FolderOpener for SystemOpener {
    fn open_folder(&self, path: &Path) -> Result<(), DomainError> {
        if !path.is_dir() {
            return Err(DomainError::Shell(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        open::that_detached(path)
            .map_err(|e| DomainError::Shell(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "opened folder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            SystemOpener.open_folder(&missing),
            Err(DomainError::Shell(_))
        ));
    }
}
