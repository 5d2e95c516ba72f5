use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use geophoto_core::CredentialStore;

/// Bearer token kept in a plain file, one line.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `token` in the platform config directory, e.g.
    /// `~/.config/geophoto/token` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "geophoto").map(|dirs| dirs.config_dir().join("token"))
    }

    /// An explicit path wins over the platform default.
    pub fn resolve(explicit: Option<PathBuf>, default: Option<PathBuf>) -> Result<Self> {
        match explicit.or(default) {
            Some(path) => Ok(Self::new(path)),
            None => anyhow::bail!(
                "Could not determine a config directory for the token, pass --credentials-file"
            ),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{token}\n"))
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
