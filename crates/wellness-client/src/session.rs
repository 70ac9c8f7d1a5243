use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

const TOKEN_FILE: &str = "session_token";

/// Durable home of the session token between client runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> std::io::Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&self.path, token).await
    }

    pub async fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
