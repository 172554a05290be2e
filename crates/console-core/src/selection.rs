//! Route-driven domain selection
//!
//! Resolves the current path parameter against the loaded collection:
//! no name, or a name the collection doesn't hold, means the overview; a
//! matching name means the editor for that domain. A not-found name is not an
//! error — it falls back to the overview with no redirect validation beyond
//! that.
//!
//! Resolution holds no state and is re-derived from `(name, collection)` on
//! every call, so it can never hand out a domain that predates a `replace`.

use crate::domains::DomainCollection;
use crate::traits::api::Domain;

/// The view the current route resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No domain selected: show the overview
    Overview,
    /// A domain is selected: show its editor
    Edit(Domain),
}

impl Selection {
    /// The selected domain, if any
    pub fn domain(&self) -> Option<&Domain> {
        match self {
            Selection::Overview => None,
            Selection::Edit(domain) => Some(domain),
        }
    }
}

/// Resolve a route parameter to a view
pub async fn resolve(name: Option<&str>, domains: &DomainCollection) -> Selection {
    match domains.find_by_name(name).await {
        Some(domain) => Selection::Edit(domain),
        None => Selection::Overview,
    }
}
