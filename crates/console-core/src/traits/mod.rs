//! Core traits for the console client
//!
//! This module defines the abstract interfaces the rest of the crate is
//! written against.
//!
//! - [`ConsoleApi`]: the console's REST surface
//! - [`TokenStore`]: durable storage for the session credential

pub mod api;
pub mod token_store;

pub use api::{ConsoleApi, Domain, RecordField, ServiceInfo, User};
pub use token_store::TokenStore;
