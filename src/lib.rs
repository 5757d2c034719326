//! In-memory, hash-linked ledger of heart-rate readings served over HTTP.

pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod model;
pub mod routes;

use std::sync::{Arc, Mutex, MutexGuard};

use error::ApiError;
use model::{Block, Ledger};

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Exclusive access for a whole read-modify-write sequence.
    pub fn lock(&self) -> Result<MutexGuard<'_, Ledger>, ApiError> {
        self.ledger.lock().map_err(|_| ApiError::LockPoisoned)
    }

    /// Copy of the current chain.
    pub fn snapshot(&self) -> Result<Vec<Block>, ApiError> {
        Ok(self.lock()?.blocks().to_vec())
    }
}
