use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// Persistent home of the bearer token (a file, a keychain, memory in tests).
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token was ever set.
    Anonymous,
    Authenticated,
    /// The backend rejected the token; the user has to log in again.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub status: SessionStatus,
}

/// Authentication context handed to every API call.
///
/// Clones share the same state: a 401/403 seen through any clone logs out
/// all of them and clears the persisted credential.
#[derive(Clone)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Session {
    /// Session without a credential store and without a token.
    pub fn anonymous() -> Self {
        Self::build(None, None)
    }

    /// In-memory session with a token, nothing is persisted.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::build(Some(token.into()), None)
    }

    /// Load a previously persisted token from `store`.
    pub fn restore(store: Arc<dyn CredentialStore>) -> io::Result<Self> {
        let token = store.load()?;
        Ok(Self::build(token, Some(store)))
    }

    fn build(token: Option<String>, store: Option<Arc<dyn CredentialStore>>) -> Self {
        let status = if token.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };
        let (tx, _rx) = watch::channel(SessionState { token, status });
        Self {
            state: Arc::new(tx),
            store,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Watch for status changes, e.g. to send the user to the login screen.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn login(&self, token: impl Into<String>) -> io::Result<()> {
        let token = token.into();
        if let Some(store) = &self.store {
            store.save(&token)?;
        }
        self.state.send_modify(|state| {
            state.token = Some(token);
            state.status = SessionStatus::Authenticated;
        });
        Ok(())
    }

    pub fn logout(&self) -> io::Result<()> {
        self.state.send_modify(|state| {
            state.token = None;
            state.status = SessionStatus::Anonymous;
        });
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    /// Called when the backend answers 401/403. Forgets the token everywhere
    /// and flags that a new login is needed.
    pub fn invalidate(&self) {
        tracing::warn!("Session rejected by backend, clearing credentials");
        self.state.send_modify(|state| {
            state.token = None;
            state.status = SessionStatus::LoginRequired;
        });
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                tracing::error!("Failed to clear persisted credentials: {:?}", e);
            }
        }
    }
}
