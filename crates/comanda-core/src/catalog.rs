//! # Extras Catalog
//!
//! Holds extras and the groups that own them, with query helpers used by
//! the selection validator and the pricing engine.
//!
//! The catalog is pure data: it is hydrated from the store layer and passed
//! by reference into cart operations. Query helpers respect `is_active` and
//! `sort_order` so snapshots come out order-stable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Extra, ExtraGroup};

/// Extras groups plus the extras they own, for one product view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtrasCatalog {
    groups: Vec<ExtraGroup>,
    extras: Vec<Extra>,
}

impl ExtrasCatalog {
    /// Builds a catalog, sorting groups and extras by `sort_order` so all
    /// iteration (and therefore every snapshot) is order-stable.
    pub fn new(mut groups: Vec<ExtraGroup>, mut extras: Vec<Extra>) -> Self {
        groups.sort_by_key(|g| g.sort_order);
        extras.sort_by_key(|e| e.sort_order);
        ExtrasCatalog { groups, extras }
    }

    /// Active groups in display order.
    pub fn groups(&self) -> impl Iterator<Item = &ExtraGroup> {
        self.groups.iter().filter(|g| g.is_active)
    }

    /// Active extras of a group in display order.
    pub fn extras_of<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Extra> {
        self.extras
            .iter()
            .filter(move |e| e.is_active && e.group_id == group_id)
    }

    /// Looks up an extra by id (active or not; persisted selections may
    /// reference extras deactivated since).
    pub fn extra(&self, extra_id: &str) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == extra_id)
    }

    /// Looks up the group owning an extra.
    pub fn group_of(&self, extra: &Extra) -> Option<&ExtraGroup> {
        self.groups.iter().find(|g| g.id == extra.group_id)
    }

    /// Number of active groups.
    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    /// Groups keyed by id, for callers that resolve many extras at once.
    pub fn groups_by_id(&self) -> HashMap<&str, &ExtraGroup> {
        self.groups.iter().map(|g| (g.id.as_str(), g)).collect()
    }

    /// True when the catalog carries no active groups at all.
    pub fn is_empty(&self) -> bool {
        self.group_count() == 0
    }
}
