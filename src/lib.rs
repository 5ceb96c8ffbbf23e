//! Client core for the nutrition-scanning service.
//!
//! [`state::AppState`] wires the session store, the authenticated API client
//! and the services built on it. Presentation layers drive
//! [`scan::ScanOrchestrator`] and subscribe to [`auth::SessionEvent`] to learn
//! about forced logouts.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod history;
pub mod profile;
pub mod results;
pub mod scan;
pub mod serde_ext;
pub mod state;
pub mod storage;
pub mod transport;

pub use error::{ClientError, ClientResult};
pub use state::AppState;
