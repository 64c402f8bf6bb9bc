//! Bearer token and profile of the signed-in clinician.
//!
//! Cleared on logout and whenever the server rejects the credential.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use fisio_core::models::user::{LoginResponse, User};

use crate::config;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug)]
pub struct SessionStore {
    current: Mutex<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Nothing touches disk. Used by tests and one-shot tools.
    pub fn in_memory() -> Self {
        Self {
            current: Mutex::new(None),
            path: None,
        }
    }

    /// Backed by a JSON file. An existing file is loaded; an unreadable one
    /// is discarded and the user has to log in again.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_session(&path) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable session file");
                None
            }
        };
        Self {
            current: Mutex::new(current),
            path: Some(path),
        }
    }

    pub fn default_path() -> Result<PathBuf, ClientError> {
        Ok(config::config_dir()?.join("session.json"))
    }

    pub async fn token(&self) -> Option<String> {
        self.current.lock().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        self.current.lock().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.lock().await.is_some()
    }

    pub async fn save(&self, login: &LoginResponse) -> Result<(), ClientError> {
        let session = Session {
            token: login.token.clone(),
            user: login.user.clone(),
        };
        if let Some(path) = &self.path {
            write_session(path, &session)?;
        }
        *self.current.lock().await = Some(session);
        Ok(())
    }

    /// Local-only profile edit; the API has no profile endpoint.
    pub async fn update_profile(
        &self,
        name: String,
        email: String,
        crefito: Option<String>,
    ) -> Result<User, ClientError> {
        let mut current = self.current.lock().await;
        let session = current
            .as_mut()
            .ok_or_else(|| ClientError::Validation("not logged in".to_string()))?;

        if name.trim().is_empty() {
            return Err(ClientError::Validation("name must not be empty".to_string()));
        }

        let mut updated = session.clone();
        updated.user.name = name;
        updated.user.email = email;
        updated.user.crefito = crefito.filter(|c| !c.trim().is_empty());

        if let Some(path) = &self.path {
            write_session(path, &updated)?;
        }
        *session = updated;
        Ok(session.user.clone())
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        *self.current.lock().await = None;
        if let Some(path) = &self.path
            && path.exists()
        {
            std::fs::remove_file(path)?;
            tracing::info!(path = %path.display(), "session cleared");
        }
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Option<Session>, ClientError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_session(path: &Path, session: &Session) -> Result<(), ClientError> {
    let json = serde_json::to_string_pretty(session)?;
    config::write_private(path, json.as_bytes())
}
