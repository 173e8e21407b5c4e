//! Application state management
//!
//! Contains shared state accessible across all handlers. Requests share
//! nothing but the store handle.

use crate::store::ContactStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Persistence for contact messages
    pub store: Arc<dyn ContactStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
