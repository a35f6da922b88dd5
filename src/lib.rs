//! # SquirrelDB
//!
//! A small REST service for squirrel records with:
//! - CRUD routing over `/squirrels` and `/squirrels/{id}`
//! - Whole-file persistence (load all, modify, save all)
//! - Per-file write serialization and atomic saves
//! - Blocking TCP server speaking HTTP/1.0
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one request per connection)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Router / Handler                              │
//! │        (method × path shape → action → status)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  SquirrelStore                               │
//! │          (get_all / get_by_id / create / ...)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  RecordFile  │
//!               │ (load / save)│
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod router;
pub mod handler;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SquirrelError, Result};
pub use config::Config;
pub use handler::Handler;
pub use store::{Squirrel, SquirrelRepository, SquirrelStore, StringStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SquirrelDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
