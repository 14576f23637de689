//! Client-side session state for the PDAP data sources app.
//!
//! This crate owns everything the client remembers between requests:
//! - Bearer token decoding (subject and expiry, no signature check)
//! - The [`SessionStore`]: identity, access/refresh tokens, redirect target
//! - A short-lived [`ResponseCache`] for GET results, grouped in [`CacheState`]
//! - Persistence hooks so a session survives a restart
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdap_session::{CacheConfig, CacheState, SessionStore, SystemClock};
//!
//! let clock = Arc::new(SystemClock);
//! let session = SessionStore::new(clock.clone());
//! let cache = CacheState::new(CacheConfig::default(), clock);
//!
//! assert!(!session.is_authenticated());
//! assert!(cache.data_sources.is_empty());
//! ```

mod cache;
mod clock;
mod config;
mod error;
mod persistence;
mod state;
mod store;
pub mod token;

pub use cache::{CacheEntry, CacheState, ResponseCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_DATA_SOURCE_TTL, DEFAULT_TTL};
pub use error::{DecodeError, Error, Result};
pub use persistence::{FileStorage, NoPersistence, PersistedSession, SessionStorage};
pub use state::{BrowsingState, SessionPhase, SessionState, StoredToken, UserProfile};
pub use store::SessionStore;
pub use token::{TokenClaims, decode_claims};
