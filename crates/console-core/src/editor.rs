//! Per-field domain editing
//!
//! The `FieldEditor` performs single-field updates against one domain with a
//! merge-on-success / error-flag-on-failure policy. Each (domain, field) pair
//! has its own pending state and error slot, so one field's in-flight request
//! never blocks another's.
//!
//! A local merge happens only after the server accepts the value; on
//! rejection the collection is untouched, so the displayed value reverts to
//! the last confirmed one.
//!
//! ## Request sequencing
//!
//! Rapid repeated edits to the same field can overlap. Each slot carries
//! monotonic request counters: a response older than the newest
//! already-resolved request for that field is dropped outright — no merge, no
//! error flag. Combined with the session generation guard this means exactly
//! one of {merged, error-set} happens per resolved call, and pending always
//! ends.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domains::DomainCollection;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::traits::api::{ConsoleApi, RecordField};

/// Field-level error surfaced to the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The server rejected the value as malformed (HTTP 400)
    Format,
    /// Any other failure: unexpected status or transport error
    Unknown,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Format => f.write_str("format error"),
            FieldError::Unknown => f.write_str("unknown error"),
        }
    }
}

/// Result of a resolved [`FieldEditor::update`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The confirmed value was merged into the collection
    Applied,
    /// A newer request for this field already resolved, or the session
    /// changed mid-flight; the response was dropped
    Discarded,
}

#[derive(Debug, Default)]
struct FieldSlot {
    /// Sequence number of the most recently issued request
    issued: u64,
    /// Highest sequence number whose outcome has been applied
    resolved: u64,
    /// Number of requests currently in flight
    in_flight: u32,
    error: Option<FieldError>,
}

type FieldKey = (String, RecordField);

/// Performs confirmed per-field updates against the domain collection
///
/// Cheap to clone; clones share the same underlying slots.
#[derive(Debug, Clone, Default)]
pub struct FieldEditor {
    slots: Arc<Mutex<HashMap<FieldKey, FieldSlot>>>,
}

impl FieldEditor {
    /// Create an editor with no pending state
    pub fn new() -> Self {
        Self::default()
    }

    /// Update one address field of one domain
    ///
    /// Issues the authenticated update and, once the server confirms it,
    /// merges the value into the collection and clears the field error. On a
    /// 400 the field error is set to [`FieldError::Format`]; on anything else
    /// to [`FieldError::Unknown`]. The collection is never touched on
    /// failure. A 401 additionally invalidates the session.
    pub async fn update(
        &self,
        api: &dyn ConsoleApi,
        session: &SessionStore,
        domains: &DomainCollection,
        name: &str,
        field: RecordField,
        value: &str,
    ) -> Result<UpdateOutcome> {
        let Some(token) = session.token().await else {
            return Err(Error::Unauthorized);
        };
        let generation = session.generation().await;

        let seq = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(key(name, field)).or_default();
            slot.issued += 1;
            slot.in_flight += 1;
            slot.issued
        };

        let result = api.update_record(&token, name, field, value).await;

        // Pending ends here no matter what; then decide whether this
        // response is still the current one for the field.
        let superseded = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(key(name, field)).or_default();
            slot.in_flight -= 1;
            if seq < slot.resolved {
                true
            } else {
                slot.resolved = seq;
                false
            }
        };
        if superseded {
            debug!("dropping superseded update for {} {}", name, field);
            return Ok(UpdateOutcome::Discarded);
        }
        if session.generation().await != generation {
            debug!("dropping update for {} {} from a superseded session", name, field);
            return Ok(UpdateOutcome::Discarded);
        }

        match result {
            Ok(()) => {
                if let Some(current) = domains.find_by_name(Some(name)).await {
                    domains.replace(name, current.with_field(field, value)).await;
                }
                self.set_error(name, field, None).await;
                debug!("updated {} {} -> {}", name, field, value);
                Ok(UpdateOutcome::Applied)
            }
            Err(e) => {
                let field_error = match e {
                    Error::InvalidFormat => FieldError::Format,
                    _ => FieldError::Unknown,
                };
                self.set_error(name, field, Some(field_error)).await;
                if e.is_unauthorized() {
                    session.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Delete a domain
    ///
    /// On success the domain is removed from the collection; on failure
    /// nothing changes locally and the caller may retry. A 401 invalidates
    /// the session.
    pub async fn delete(
        &self,
        api: &dyn ConsoleApi,
        session: &SessionStore,
        domains: &DomainCollection,
        name: &str,
    ) -> Result<()> {
        let Some(token) = session.token().await else {
            return Err(Error::Unauthorized);
        };
        let generation = session.generation().await;

        match api.delete_domain(&token, name).await {
            Ok(()) => {
                if session.generation().await == generation {
                    domains.remove(name).await;
                    debug!("deleted domain {}", name);
                }
                Ok(())
            }
            Err(e) => {
                if e.is_unauthorized() && session.generation().await == generation {
                    session.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Whether a request for this field is currently in flight
    pub async fn is_pending(&self, name: &str, field: RecordField) -> bool {
        let slots = self.slots.lock().await;
        slots
            .get(&key(name, field))
            .is_some_and(|slot| slot.in_flight > 0)
    }

    /// The current field-level error, if any
    pub async fn field_error(&self, name: &str, field: RecordField) -> Option<FieldError> {
        let slots = self.slots.lock().await;
        slots.get(&key(name, field)).and_then(|slot| slot.error)
    }

    /// Dismiss a field-level error (e.g. when the user edits the value again)
    pub async fn clear_error(&self, name: &str, field: RecordField) {
        self.set_error(name, field, None).await;
    }

    async fn set_error(&self, name: &str, field: RecordField, error: Option<FieldError>) {
        let mut slots = self.slots.lock().await;
        slots.entry(key(name, field)).or_default().error = error;
    }
}

fn key(name: &str, field: RecordField) -> FieldKey {
    (name.to_string(), field)
}
