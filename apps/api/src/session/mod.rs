//! Session context: the user/session/profile identifiers shared by the upload,
//! chat and analysis flows. Stored once in `AppState`, persisted as JSON.

pub mod handlers;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::backend::UploadIdentifiers;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub profile_id: Option<String>,
}

impl SessionContext {
    /// Overwrites only the identifiers the upload response actually carried.
    pub fn apply_upload(&mut self, ids: &UploadIdentifiers) {
        if let Some(user_id) = &ids.user_id {
            self.user_id = Some(user_id.clone());
        }
        if let Some(session_id) = &ids.session_id {
            self.session_id = Some(session_id.clone());
        }
        if let Some(profile_id) = &ids.profile_id {
            self.profile_id = Some(profile_id.clone());
        }
    }
}

pub struct SessionStore {
    path: PathBuf,
    context: RwLock<SessionContext>,
}

impl SessionStore {
    /// Loads the stored context. A missing file starts an empty session.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let context = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}, starting empty", path.display());
                SessionContext::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(SessionStore {
            path,
            context: RwLock::new(context),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> SessionContext {
        self.context.read().await.clone()
    }

    /// Merges identifiers from an upload response and persists the result.
    pub async fn record_upload(
        &self,
        ids: &UploadIdentifiers,
    ) -> Result<SessionContext, SessionError> {
        let mut context = self.context.write().await;
        context.apply_upload(ids);
        self.persist(&context).await?;
        info!(
            "Session updated from upload (user_id: {:?}, profile_id: {:?})",
            context.user_id, context.profile_id
        );
        Ok(context.clone())
    }

    /// Returns the current context, generating and persisting a session id
    /// first if none exists yet.
    pub async fn ensure_session_id(&self) -> Result<SessionContext, SessionError> {
        let mut context = self.context.write().await;
        if context.session_id.is_none() {
            let session_id = Uuid::new_v4().to_string();
            info!("Started chat session {}", session_id);
            context.session_id = Some(session_id);
            self.persist(&context).await?;
        }
        Ok(context.clone())
    }

    async fn persist(&self, context: &SessionContext) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_vec_pretty(context)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(user: Option<&str>, session: Option<&str>, profile: Option<&str>) -> UploadIdentifiers {
        UploadIdentifiers {
            user_id: user.map(str::to_string),
            session_id: session.map(str::to_string),
            profile_id: profile.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("session.json")).await.unwrap();
        assert_eq!(store.snapshot().await, SessionContext::default());
    }

    #[tokio::test]
    async fn test_upload_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::load(&path).await.unwrap();
        store
            .record_upload(&ids(Some("u-1"), None, Some("p-9")))
            .await
            .unwrap();

        let reloaded = SessionStore::load(&path).await.unwrap();
        let context = reloaded.snapshot().await;
        assert_eq!(context.user_id.as_deref(), Some("u-1"));
        assert_eq!(context.profile_id.as_deref(), Some("p-9"));
        assert_eq!(context.session_id, None);
    }

    #[tokio::test]
    async fn test_upload_keeps_identifiers_it_did_not_carry() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("session.json")).await.unwrap();

        store
            .record_upload(&ids(Some("u-1"), Some("s-1"), None))
            .await
            .unwrap();
        let context = store
            .record_upload(&ids(None, None, Some("p-2")))
            .await
            .unwrap();

        assert_eq!(context.user_id.as_deref(), Some("u-1"));
        assert_eq!(context.session_id.as_deref(), Some("s-1"));
        assert_eq!(context.profile_id.as_deref(), Some("p-2"));
    }

    #[tokio::test]
    async fn test_session_id_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::load(&path).await.unwrap();

        let first = store.ensure_session_id().await.unwrap();
        let second = store.ensure_session_id().await.unwrap();
        let session_id = first.session_id.unwrap();
        assert!(Uuid::parse_str(&session_id).is_ok());
        assert_eq!(second.session_id.as_deref(), Some(session_id.as_str()));

        let reloaded = SessionStore::load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await.session_id, Some(session_id));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = SessionStore::load(&path).await.err().unwrap();
        assert!(matches!(err, SessionError::Corrupt(_)));
    }
}
