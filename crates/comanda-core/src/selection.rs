//! # Selection Validation
//!
//! Enforces group-level selection-count rules (min/max, required) and
//! single-option exclusivity for options-bearing extras.
//!
//! ## Counting Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  A selection "qualifies" toward its group's count when:             │
//! │                                                                     │
//! │    flat extra     → it is toggled on            (0 or 1 unit)       │
//! │    options extra  → an option is chosen         (at most 1 option)  │
//! │                                                                     │
//! │  is_group_valid   : qualifying count ≥ min_selections               │
//! │  can_select_more  : qualifying count < max_selections               │
//! │  all_groups_valid : every REQUIRED group is valid                   │
//! │                     (non-required unmet minimums block nothing)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure predicate over caller-owned state. Toggling an
//! extra off always succeeds even if the group drops below its minimum;
//! replacing the chosen option of an already-selected extra never counts as
//! an additional selection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ExtrasCatalog;
use crate::error::{CoreError, CoreResult};
use crate::types::ExtraGroup;

// =============================================================================
// Selections
// =============================================================================

/// What the shopper chose for one extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraChoice {
    /// Flat extra toggled on.
    Toggled,
    /// Options-bearing extra with the chosen option id.
    Option(String),
}

/// The set of chosen extras for one line under composition.
///
/// Keyed by extra id; an absent key means "not selected". The map alone
/// carries no prices; pricing resolves against the live catalog and then
/// freezes a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    chosen: HashMap<String, ExtraChoice>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// The choice recorded for an extra, if any.
    pub fn choice(&self, extra_id: &str) -> Option<&ExtraChoice> {
        self.chosen.get(extra_id)
    }

    /// Whether an extra contributes a qualifying selection.
    pub fn is_selected(&self, extra_id: &str) -> bool {
        self.chosen.contains_key(extra_id)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Removes a selection. Deselecting always succeeds, even when the
    /// group then falls below its minimum.
    pub fn deselect(&mut self, extra_id: &str) {
        self.chosen.remove(extra_id);
    }
}

// =============================================================================
// Group Predicates
// =============================================================================

/// Counts the qualifying selections of a group.
pub fn qualifying_count(catalog: &ExtrasCatalog, group: &ExtraGroup, selections: &Selections) -> i64 {
    catalog
        .extras_of(&group.id)
        .filter(|e| selections.is_selected(&e.id))
        .count() as i64
}

/// True iff the group's qualifying count meets its minimum.
pub fn is_group_valid(catalog: &ExtrasCatalog, group: &ExtraGroup, selections: &Selections) -> bool {
    qualifying_count(catalog, group, selections) >= group.min_selections
}

/// True iff another selection would still be within the group's maximum.
pub fn can_select_more(
    catalog: &ExtrasCatalog,
    group: &ExtraGroup,
    selections: &Selections,
) -> bool {
    qualifying_count(catalog, group, selections) < group.max_selections
}

/// True iff every *required* group is valid.
///
/// Non-required groups with unmet minimums are tolerated; the UI may still
/// display the remaining requirement, but they block nothing.
pub fn all_groups_valid(catalog: &ExtrasCatalog, selections: &Selections) -> bool {
    catalog
        .groups()
        .filter(|g| g.is_required)
        .all(|g| is_group_valid(catalog, g, selections))
}

/// The first required group whose minimum is unmet, with its current count.
///
/// Used to build a specific rejection reason for the caller.
pub fn first_unmet_group<'a>(
    catalog: &'a ExtrasCatalog,
    selections: &Selections,
) -> Option<(&'a ExtraGroup, i64)> {
    catalog
        .groups()
        .filter(|g| g.is_required)
        .find_map(|g| {
            let count = qualifying_count(catalog, g, selections);
            (count < g.min_selections).then_some((g, count))
        })
}

// =============================================================================
// Mutation
// =============================================================================

/// Records a selection, enforcing the group's maximum.
///
/// ## Rules
/// - Selecting an extra already selected *replaces* its choice; swapping
///   the option of a single-option extra never counts twice, so it is
///   allowed even when the group is at its maximum.
/// - A genuinely new selection is rejected once `max_selections` is
///   reached; the existing selections are left untouched.
/// - Choices are normalized against the catalog: a flat extra always
///   records `Toggled`; an options extra ignores a bare toggle and an
///   unknown option id (missing/invalid input is inert, not an error).
/// - An extra unknown to the catalog is ignored.
pub fn try_select(
    catalog: &ExtrasCatalog,
    selections: &mut Selections,
    extra_id: &str,
    choice: ExtraChoice,
) -> CoreResult<()> {
    let Some(extra) = catalog.extra(extra_id) else {
        return Ok(());
    };

    let normalized = if extra.has_options {
        match choice {
            ExtraChoice::Option(option_id) if extra.option(&option_id).is_some() => {
                ExtraChoice::Option(option_id)
            }
            _ => return Ok(()),
        }
    } else {
        ExtraChoice::Toggled
    };

    // Replacement never changes the qualifying count.
    if selections.is_selected(extra_id) {
        selections.chosen.insert(extra_id.to_string(), normalized);
        return Ok(());
    }

    if let Some(group) = catalog.group_of(extra) {
        if !can_select_more(catalog, group, selections) {
            return Err(CoreError::SelectionLimitReached {
                group: group.name.clone(),
                max: group.max_selections,
            });
        }
    }

    selections.chosen.insert(extra_id.to_string(), normalized);
    Ok(())
}

/// Flips a flat extra: off → on (subject to the maximum), on → off.
pub fn toggle(
    catalog: &ExtrasCatalog,
    selections: &mut Selections,
    extra_id: &str,
) -> CoreResult<()> {
    if selections.is_selected(extra_id) {
        selections.deselect(extra_id);
        Ok(())
    } else {
        try_select(catalog, selections, extra_id, ExtraChoice::Toggled)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extra, ExtraOption};

    fn group(id: &str, min: i64, max: i64, required: bool) -> ExtraGroup {
        ExtraGroup {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            name: format!("Group {id}"),
            min_selections: min,
            max_selections: max,
            is_required: required,
            sort_order: 0,
            is_active: true,
        }
    }

    fn flat(id: &str, group_id: &str, price: i64) -> Extra {
        Extra {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: format!("Extra {id}"),
            price_cents: price,
            has_options: false,
            options: vec![],
            sort_order: 0,
            is_active: true,
        }
    }

    fn with_options(id: &str, group_id: &str, options: &[(&str, &str, i64)]) -> Extra {
        Extra {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: format!("Extra {id}"),
            price_cents: 0,
            has_options: true,
            options: options
                .iter()
                .map(|(oid, label, price)| ExtraOption {
                    id: oid.to_string(),
                    label: label.to_string(),
                    price_cents: *price,
                })
                .collect(),
            sort_order: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_empty_selections_valid_iff_min_zero() {
        let catalog = ExtrasCatalog::new(
            vec![group("g0", 0, 2, true), group("g1", 1, 2, true)],
            vec![flat("e0", "g0", 0), flat("e1", "g1", 0)],
        );
        let selections = Selections::new();

        let g0 = catalog.groups().find(|g| g.id == "g0").unwrap();
        let g1 = catalog.groups().find(|g| g.id == "g1").unwrap();

        assert!(is_group_valid(&catalog, g0, &selections));
        assert!(!is_group_valid(&catalog, g1, &selections));
    }

    #[test]
    fn test_required_single_choice_group() {
        // minSelections=1, maxSelections=1, required.
        let catalog = ExtrasCatalog::new(
            vec![group("g", 1, 1, true)],
            vec![
                with_options("e1", "g", &[("o1", "Simple", 0), ("o2", "Doble", 500)]),
                with_options("e2", "g", &[("o3", "Triple", 900)]),
            ],
        );
        let mut selections = Selections::new();

        assert!(!all_groups_valid(&catalog, &selections));

        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("o1".into()),
        )
        .unwrap();
        assert!(all_groups_valid(&catalog, &selections));

        // Selecting a second extra in the same group is rejected; the first
        // selection remains.
        let err = try_select(
            &catalog,
            &mut selections,
            "e2",
            ExtraChoice::Option("o3".into()),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::SelectionLimitReached { .. }));
        assert_eq!(
            selections.choice("e1"),
            Some(&ExtraChoice::Option("o1".into()))
        );
        assert!(!selections.is_selected("e2"));
    }

    #[test]
    fn test_replacing_option_allowed_at_max() {
        let catalog = ExtrasCatalog::new(
            vec![group("g", 1, 1, true)],
            vec![with_options(
                "e1",
                "g",
                &[("o1", "Simple", 0), ("o2", "Doble", 500)],
            )],
        );
        let mut selections = Selections::new();

        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("o1".into()),
        )
        .unwrap();

        // Swap, don't add: permitted even though the group is at max.
        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("o2".into()),
        )
        .unwrap();

        assert_eq!(
            selections.choice("e1"),
            Some(&ExtraChoice::Option("o2".into()))
        );
        let g = catalog.groups().next().unwrap();
        assert_eq!(qualifying_count(&catalog, g, &selections), 1);
    }

    #[test]
    fn test_deselect_below_minimum_always_succeeds() {
        let catalog = ExtrasCatalog::new(vec![group("g", 1, 1, true)], vec![flat("e1", "g", 0)]);
        let mut selections = Selections::new();

        toggle(&catalog, &mut selections, "e1").unwrap();
        assert!(all_groups_valid(&catalog, &selections));

        toggle(&catalog, &mut selections, "e1").unwrap();
        assert!(selections.is_empty());
        assert!(!all_groups_valid(&catalog, &selections));
    }

    #[test]
    fn test_non_required_unmet_minimum_blocks_nothing() {
        let catalog = ExtrasCatalog::new(
            vec![group("g", 2, 3, false)],
            vec![flat("e1", "g", 0), flat("e2", "g", 0)],
        );
        let selections = Selections::new();

        let g = catalog.groups().next().unwrap();
        assert!(!is_group_valid(&catalog, g, &selections));
        assert!(all_groups_valid(&catalog, &selections));
        assert!(first_unmet_group(&catalog, &selections).is_none());
    }

    #[test]
    fn test_first_unmet_group_reports_count() {
        let catalog = ExtrasCatalog::new(
            vec![group("g", 2, 3, true)],
            vec![flat("e1", "g", 0), flat("e2", "g", 0)],
        );
        let mut selections = Selections::new();
        toggle(&catalog, &mut selections, "e1").unwrap();

        let (g, count) = first_unmet_group(&catalog, &selections).unwrap();
        assert_eq!(g.id, "g");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unknown_extra_and_invalid_option_are_inert() {
        let catalog = ExtrasCatalog::new(
            vec![group("g", 0, 1, false)],
            vec![with_options("e1", "g", &[("o1", "Simple", 0)])],
        );
        let mut selections = Selections::new();

        try_select(&catalog, &mut selections, "ghost", ExtraChoice::Toggled).unwrap();
        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("nope".into()),
        )
        .unwrap();

        assert!(selections.is_empty());
    }

    #[test]
    fn test_flat_extra_counts_once_regardless_of_choice_shape() {
        let catalog = ExtrasCatalog::new(vec![group("g", 0, 2, false)], vec![flat("e1", "g", 300)]);
        let mut selections = Selections::new();

        // A bogus Option choice on a flat extra normalizes to Toggled.
        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("o9".into()),
        )
        .unwrap();

        assert_eq!(selections.choice("e1"), Some(&ExtraChoice::Toggled));
        let g = catalog.groups().next().unwrap();
        assert_eq!(qualifying_count(&catalog, g, &selections), 1);
    }
}
