//! Where the client keeps the bearer token between calls.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::client::ClientError;

/// Persists the bearer token issued by `/login`.
pub trait TokenStore: Send + Sync {
    /// The saved token, or `None` if the user is logged out.
    fn load(&self) -> Option<String>;

    /// Replace the saved token.
    fn save(&self, token: &str) -> Result<(), ClientError>;

    /// Forget the saved token.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Keeps the token in a plain text file so it survives between CLI runs.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`. The file is created on first log in.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();

        (!token.is_empty()).then(|| token.to_owned())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        fs::write(&self.path, token).map_err(|error| ClientError::TokenStore(error.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ClientError::TokenStore(error.to_string())),
        }
    }
}

/// Keeps the token in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// A store that starts logged out.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts logged in with `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        let mut stored = self
            .token
            .lock()
            .map_err(|error| ClientError::TokenStore(error.to_string()))?;
        *stored = Some(token.to_owned());

        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut stored = self
            .token
            .lock()
            .map_err(|error| ClientError::TokenStore(error.to_string()))?;
        *stored = None;

        Ok(())
    }
}
