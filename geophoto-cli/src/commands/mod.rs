pub mod albums;
pub mod auth;
pub mod photos;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use geophoto_core::{ApiClient, BackendConfig, Session};

use crate::credentials::FileCredentialStore;

/// What every command needs: a client for the backend and the user's session.
pub struct Context {
    pub api: ApiClient,
    pub session: Session,
}

impl Context {
    pub fn new(backend_url: &str, credentials_file: Option<PathBuf>) -> Result<Self> {
        let store =
            FileCredentialStore::resolve(credentials_file, FileCredentialStore::default_path())?;
        tracing::debug!("Using credentials at {}", store.path().display());

        let session = Session::restore(Arc::new(store.clone()))
            .with_context(|| format!("Failed to read {}", store.path().display()))?;
        let api = ApiClient::new(BackendConfig::new(backend_url))?;

        Ok(Self { api, session })
    }
}

/// Whether the backend rejected the stored token somewhere down the chain.
pub fn is_auth_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<geophoto_core::Error>(),
            Some(e) if e.is_auth()
        ) || matches!(
            cause.downcast_ref::<geophoto_core::UploadFlowError>(),
            Some(geophoto_core::UploadFlowError::Upload(e)) if e.is_auth()
        )
    })
}
