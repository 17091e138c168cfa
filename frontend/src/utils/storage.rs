//! Persisted session capability: `persist(session, ttl)`, `load()`, `clear()`.
//!
//! Stores hold one JSON envelope under [`SESSION_STORAGE_KEY`]. Browser builds
//! use `localStorage`; host builds and tests use [`MemoryStore`].

use std::{cell::RefCell, rc::Rc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{api::ApiError, state::session::Session, utils::time};

pub const SESSION_STORAGE_KEY: &str = "gamevault_session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    session: Session,
    expires_at: DateTime<Utc>,
}

pub fn encode_session(
    session: &Session,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| ApiError::Storage(e.to_string()))?;
    let stored = StoredSession {
        session: session.clone(),
        expires_at: now + ttl,
    };
    serde_json::to_string(&stored).map_err(|e| ApiError::Storage(e.to_string()))
}

/// `Ok(None)` for an expired envelope, `Err` for anything undecodable.
pub fn decode_session(raw: &str, now: DateTime<Utc>) -> Result<Option<Session>, ApiError> {
    let stored: StoredSession =
        serde_json::from_str(raw).map_err(|e| ApiError::Storage(e.to_string()))?;
    if stored.expires_at <= now {
        return Ok(None);
    }
    Ok(Some(stored.session))
}

pub trait SessionStore {
    fn read_raw(&self) -> Result<Option<String>, ApiError>;
    fn write_raw(&self, value: &str) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;

    fn persist(&self, session: &Session, ttl: Duration) -> Result<(), ApiError> {
        self.write_raw(&encode_session(session, ttl, time::now())?)
    }

    /// Expired entries are cleared and reported as absent.
    fn load(&self) -> Result<Option<Session>, ApiError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(None);
        };
        let session = decode_session(&raw, time::now())?;
        if session.is_none() {
            log::info!("stored session expired, clearing it");
            self.clear()?;
        }
        Ok(session)
    }
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SessionStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>, ApiError> {
        Ok(self.slot.borrow().clone())
    }

    fn write_raw(&self, value: &str) -> Result<(), ApiError> {
        *self.slot.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl SessionStore for BrowserStore {
    fn read_raw(&self) -> Result<Option<String>, ApiError> {
        crate::utils::browser::local_storage()?
            .get_item(SESSION_STORAGE_KEY)
            .map_err(|_| ApiError::Storage("failed to read session".to_string()))
    }

    fn write_raw(&self, value: &str) -> Result<(), ApiError> {
        crate::utils::browser::local_storage()?
            .set_item(SESSION_STORAGE_KEY, value)
            .map_err(|_| ApiError::Storage("failed to write session".to_string()))
    }

    fn clear(&self) -> Result<(), ApiError> {
        crate::utils::browser::local_storage()?
            .remove_item(SESSION_STORAGE_KEY)
            .map_err(|_| ApiError::Storage("failed to clear session".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Rc<dyn SessionStore> {
    Rc::new(BrowserStore)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Rc<dyn SessionStore> {
    Rc::new(MemoryStore::new())
}
