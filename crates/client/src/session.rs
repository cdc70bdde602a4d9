//! Bearer-token holder shared by the gateway and the store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ClientError;

/// The current bearer token, optionally mirrored to a file.
///
/// Loaded once at startup; replaced on sign-in and cleared on sign-out.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl Session {
    /// A session that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load a session backed by `path`. A missing or empty file means
    /// "signed out".
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let token = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), restored = token.is_some(), "Session loaded");
        Ok(Self {
            token: RwLock::new(token),
            path: Some(path),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store a new token and persist it.
    pub async fn set(&self, token: String) -> Result<(), ClientError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            write_private(path, &token).await?;
        }
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
        Ok(())
    }

    /// Forget the token and remove the file. The in-memory token is cleared
    /// even when the file cannot be removed.
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Write `contents` to `path`, readable by the owner only on Unix.
async fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    // `mode` only applies on creation; tighten a pre-existing file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    file.write_all(contents.as_bytes()).await?;
    file.flush().await
}
