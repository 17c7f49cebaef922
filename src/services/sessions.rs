//! Admin session store
//!
//! Sessions are opaque random tokens kept in memory; they do not survive a
//! restart.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::error::{AppError, AppResult};

const SESSION_ID_BYTES: usize = 32;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashSet<String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session and return its id
    pub fn create(&self) -> AppResult<String> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::Internal(format!("Failed to generate session id: {}", e)))?;
        let id = URL_SAFE_NO_PAD.encode(bytes);

        self.sessions
            .write()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?
            .insert(id.clone());

        Ok(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.sessions
            .read()
            .map(|sessions| sessions.contains(id))
            .unwrap_or(false)
    }

    /// Forget a session; unknown ids are ignored
    pub fn remove(&self, id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(id);
        }
    }
}
