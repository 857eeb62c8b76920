//! Durable session storage. Two keys are kept side by side: the opaque bearer
//! token and the serialized user record. Only the session manager writes
//! here; the API client reads the token to attach it to requests.

use crate::auth::types::UserSummary;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored {key} record is corrupt: {message}")]
    Corrupt { key: &'static str, message: String },
}

pub trait SessionStore: Send + Sync {
    /// Reads the stored bearer token, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn load_token(&self) -> Result<Option<SecretString>, StorageError>;

    /// Reads the stored user record, if any.
    ///
    /// # Errors
    /// Returns an error if the record cannot be read or decoded.
    fn load_user(&self) -> Result<Option<UserSummary>, StorageError>;

    /// Writes both keys.
    ///
    /// # Errors
    /// Returns an error if either key cannot be written.
    fn save(&self, token: &SecretString, user: &UserSummary) -> Result<(), StorageError>;

    /// Removes both keys. Removing keys that are absent is not an error.
    ///
    /// # Errors
    /// Returns an error if an existing key cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Stores the two keys as files in a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(format!("{USER_KEY}.json"))
    }

    /// Writes `contents` to a sibling temp file and returns its path. Nothing
    /// at `path` changes until the temp file is renamed over it.
    fn stage(&self, path: &Path, contents: &[u8]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("tmp");

        let written = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(contents)?;
            file.sync_all()
        })();

        if let Err(err) = written {
            let _ = remove_optional(&tmp);
            return Err(err.into());
        }
        Ok(tmp)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn remove_optional(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

impl SessionStore for FileStore {
    fn load_token(&self) -> Result<Option<SecretString>, StorageError> {
        let token = read_optional(&self.token_path())?
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(SecretString::from);
        Ok(token)
    }

    fn load_user(&self) -> Result<Option<UserSummary>, StorageError> {
        let Some(raw) = read_optional(&self.user_path())? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Corrupt {
                key: USER_KEY,
                message: err.to_string(),
            })
    }

    fn save(&self, token: &SecretString, user: &UserSummary) -> Result<(), StorageError> {
        let user_json = serde_json::to_vec_pretty(user).map_err(|err| StorageError::Corrupt {
            key: USER_KEY,
            message: err.to_string(),
        })?;

        // stage both keys before touching either, so a failed write leaves
        // the previous pair in place
        let user_path = self.user_path();
        let token_path = self.token_path();
        let user_tmp = self.stage(&user_path, &user_json)?;
        let token_tmp = match self.stage(&token_path, token.expose_secret().as_bytes()) {
            Ok(tmp) => tmp,
            Err(err) => {
                let _ = remove_optional(&user_tmp);
                return Err(err);
            }
        };

        let previous_user = read_optional(&user_path).ok().flatten();
        if let Err(err) = fs::rename(&user_tmp, &user_path) {
            let _ = remove_optional(&user_tmp);
            let _ = remove_optional(&token_tmp);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&token_tmp, &token_path) {
            warn!("Failed to write token, restoring previous user record");
            let _ = remove_optional(&token_tmp);
            let _ = match previous_user {
                Some(raw) => self
                    .stage(&user_path, raw.as_bytes())
                    .and_then(|tmp| fs::rename(tmp, &user_path).map_err(StorageError::from)),
                None => remove_optional(&user_path),
            };
            return Err(err.into());
        }

        debug!("session saved to {}", self.dir.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        remove_optional(&self.token_path())?;
        remove_optional(&self.user_path())?;
        debug!("session cleared from {}", self.dir.display());
        Ok(())
    }
}

/// In-memory store for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<(SecretString, UserSummary)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(token: &str, user: UserSummary) -> Self {
        Self {
            inner: Mutex::new(Some((SecretString::from(token.to_string()), user))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(SecretString, UserSummary)>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn load_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.lock().as_ref().map(|(token, _)| token.clone()))
    }

    fn load_user(&self) -> Result<Option<UserSummary>, StorageError> {
        Ok(self.lock().as_ref().map(|(_, user)| user.clone()))
    }

    fn save(&self, token: &SecretString, user: &UserSummary) -> Result<(), StorageError> {
        *self.lock() = Some((token.clone(), user.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}
