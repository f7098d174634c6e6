//! `catalog` crate — the read-only action registry (C1).
//!
//! An [`Action`] is a named, externally-hosted HTTP operation. The
//! [`ActionCatalog`] is an in-memory, read-at-runtime registry the
//! validator and executor consult by name. It never mutates entries
//! itself — seeding the catalog from static files is out of scope here
//! (see workspace root spec) and is somebody else's job.

pub mod error;
pub mod model;
pub mod client;

pub use client::ActionServiceClient;
pub use error::CatalogError;
pub use model::Action;

use std::collections::HashMap;

/// Read-only lookup over a fixed set of actions.
///
/// Construct once (typically from a `db` query at startup or per request)
/// and share behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    by_name: HashMap<String, Action>,
}

impl ActionCatalog {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        let by_name = actions
            .into_iter()
            .map(|a| (a.action_name.clone(), a))
            .collect();
        Self { by_name }
    }

    /// Look up an action by name regardless of its `is_active` flag.
    pub fn get(&self, action_name: &str) -> Option<&Action> {
        self.by_name.get(action_name)
    }

    /// Look up an action by name, returning `None` if it is inactive.
    ///
    /// This is the check the DAG validator (C2) and the conversation
    /// agent's enrichment step actually want: an inactive action is
    /// treated the same as an unknown one.
    pub fn get_active(&self, action_name: &str) -> Option<&Action> {
        self.by_name
            .get(action_name)
            .filter(|action| action.is_active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Minimal capability the validator (C2) needs: "does this active action
/// exist". Implemented by [`ActionCatalog`] directly; kept as a trait so
/// the engine crate doesn't need to depend on `catalog` for its tests.
pub trait CatalogLookup {
    fn is_active_action(&self, action_name: &str) -> bool;
}

impl CatalogLookup for ActionCatalog {
    fn is_active_action(&self, action_name: &str) -> bool {
        self.get_active(action_name).is_some()
    }
}
