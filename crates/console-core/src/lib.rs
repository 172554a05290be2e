// # console-core
//
// Client-side core for a DNS-record management console.
//
// ## Architecture Overview
//
// This library provides the session and resource-editing logic behind the
// console:
// - **ConsoleApi**: Trait describing the service's REST surface
// - **TokenStore**: Trait for durable storage of the session credential
// - **SessionStore**: Token + identity lifecycle (login, revalidation, logout)
// - **DomainCollection**: The per-session list of domain resources
// - **FieldEditor**: Confirmed per-field address updates and deletes
// - **selection**: Route parameter → overview/edit resolution
//
// ## Design Principles
//
// 1. **Single writer**: session state is owned by `SessionStore` and mutated
//    only through its contract; nothing reaches around it
// 2. **Confirmed mutation**: local domain state changes only after the server
//    accepts the change; rejection reverts to the last confirmed value
// 3. **De-auth on ambiguity**: any doubt about the identity behind the token
//    resolves to the unauthenticated state, never to stale state
// 4. **Stale-response discipline**: responses issued under a superseded
//    session or superseded by a newer request for the same field are dropped

pub mod config;
pub mod domains;
pub mod editor;
pub mod error;
pub mod selection;
pub mod session;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::ConsoleConfig;
pub use domains::{DomainCollection, LoadOutcome};
pub use editor::{FieldEditor, FieldError, UpdateOutcome};
pub use error::{Error, Result};
pub use selection::{Selection, resolve};
pub use session::{SessionStatus, SessionStore};
pub use store::{FileTokenStore, MemoryTokenStore};
pub use traits::{ConsoleApi, Domain, RecordField, ServiceInfo, TokenStore, User};
