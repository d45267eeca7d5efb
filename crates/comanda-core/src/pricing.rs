//! # Pricing Engine
//!
//! Turns a product, a set of selected extras, and a quantity into a priced
//! line with a frozen extras snapshot.
//!
//! ## Price Flow
//! ```text
//! Product.price_cents ──┐
//!                       ├──► unit_price = base + Σ extras ──► line_total
//! selected extras ──────┘                                      │
//!        │                                                      ▼
//!        └──► extras snapshot: [{id, name, price}]   unit_price × quantity
//! ```
//!
//! Pricing never fails: missing or invalid numeric inputs are treated as 0,
//! unknown extras and options are skipped. All arithmetic is integer cents,
//! so line math is exact and rounding only ever matters at the checkout
//! total-aggregation boundary (where integer cents make it a no-op).

use serde::{Deserialize, Serialize};

use crate::catalog::ExtrasCatalog;
use crate::money::Money;
use crate::selection::{ExtraChoice, Selections};
use crate::types::{ExtraChoiceSnapshot, Product};

/// The result of pricing one line under composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Base price + extras total, in cents.
    pub unit_price_cents: i64,
    /// unit_price × quantity, in cents.
    pub line_total_cents: i64,
    /// Flattened, order-stable extras entries with frozen prices.
    /// Options are rendered as `"<extraName>: <optionLabel>"`.
    pub extras: Vec<ExtraChoiceSnapshot>,
}

impl PricedLine {
    /// Re-derives the line total from the snapshot alone, independent of
    /// the live catalog. A snapshot is self-sufficient: this must equal
    /// `line_total_cents` for the same base price and quantity.
    pub fn total_from_snapshot(&self, base_price_cents: i64, quantity: i64) -> i64 {
        let extras: i64 = self.extras.iter().map(|e| e.price_cents.max(0)).sum();
        let unit = Money::from_cents(base_price_cents.max(0) + extras);
        unit.multiply_quantity(quantity).cents()
    }
}

/// Prices a line: `unit_price = base + Σ extras`, `line_total = unit × qty`.
///
/// Snapshot order follows the catalog's group and extra `sort_order`, so the
/// same selections always produce the same entry order.
pub fn price_line(
    product: &Product,
    catalog: &ExtrasCatalog,
    selections: &Selections,
    quantity: i64,
) -> PricedLine {
    let mut extras = Vec::new();
    let mut extras_total = Money::zero();

    for group in catalog.groups() {
        for extra in catalog.extras_of(&group.id) {
            let Some(choice) = selections.choice(&extra.id) else {
                continue;
            };

            let (name, price_cents) = match choice {
                ExtraChoice::Toggled => (extra.name.clone(), extra.price_cents.max(0)),
                ExtraChoice::Option(option_id) => match extra.option(option_id) {
                    Some(option) => (
                        format!("{}: {}", extra.name, option.label),
                        option.price_cents.max(0),
                    ),
                    // Stale option id: contributes nothing.
                    None => continue,
                },
            };

            extras_total += Money::from_cents(price_cents);
            extras.push(ExtraChoiceSnapshot {
                extra_id: extra.id.clone(),
                name,
                price_cents,
            });
        }
    }

    let unit_price = product.price() + extras_total;
    let line_total = unit_price.multiply_quantity(quantity.max(0));

    PricedLine {
        unit_price_cents: unit_price.cents(),
        line_total_cents: line_total.cents(),
        extras,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::try_select;
    use crate::types::{Extra, ExtraGroup, ExtraOption};
    use chrono::Utc;

    fn product(price_cents: i64) -> Product {
        Product {
            id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Lomito".to_string(),
            description: None,
            price_cents,
            stock: None,
            category_id: None,
            extra_group_ids: vec!["g1".to_string()],
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn group(id: &str, sort_order: i64) -> ExtraGroup {
        ExtraGroup {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            name: format!("Group {id}"),
            min_selections: 0,
            max_selections: 5,
            is_required: false,
            sort_order,
            is_active: true,
        }
    }

    fn flat(id: &str, group_id: &str, name: &str, price: i64, sort_order: i64) -> Extra {
        Extra {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: name.to_string(),
            price_cents: price,
            has_options: false,
            options: vec![],
            sort_order,
            is_active: true,
        }
    }

    #[test]
    fn test_flat_extra_pricing() {
        // base 2500, flat "Bacon" 800, quantity 2
        let catalog = ExtrasCatalog::new(
            vec![group("g1", 0)],
            vec![flat("e1", "g1", "Bacon", 800, 0)],
        );
        let mut selections = Selections::new();
        try_select(&catalog, &mut selections, "e1", ExtraChoice::Toggled).unwrap();

        let priced = price_line(&product(2500), &catalog, &selections, 2);

        assert_eq!(priced.unit_price_cents, 3300);
        assert_eq!(priced.line_total_cents, 6600);
        assert_eq!(priced.extras.len(), 1);
        assert_eq!(priced.extras[0].name, "Bacon");
        assert_eq!(priced.extras[0].price_cents, 800);
    }

    #[test]
    fn test_option_rendered_with_extra_name() {
        let extra = Extra {
            id: "e1".to_string(),
            group_id: "g1".to_string(),
            name: "Milanesa".to_string(),
            price_cents: 0,
            has_options: true,
            options: vec![
                ExtraOption {
                    id: "o1".to_string(),
                    label: "Simple".to_string(),
                    price_cents: 0,
                },
                ExtraOption {
                    id: "o2".to_string(),
                    label: "Doble".to_string(),
                    price_cents: 700,
                },
            ],
            sort_order: 0,
            is_active: true,
        };
        let catalog = ExtrasCatalog::new(vec![group("g1", 0)], vec![extra]);
        let mut selections = Selections::new();
        try_select(
            &catalog,
            &mut selections,
            "e1",
            ExtraChoice::Option("o2".into()),
        )
        .unwrap();

        let priced = price_line(&product(1000), &catalog, &selections, 1);

        assert_eq!(priced.unit_price_cents, 1700);
        assert_eq!(priced.extras[0].name, "Milanesa: Doble");
    }

    #[test]
    fn test_snapshot_is_order_stable() {
        let catalog = ExtrasCatalog::new(
            vec![group("g2", 2), group("g1", 1)],
            vec![
                flat("b", "g2", "Second", 100, 0),
                flat("a", "g1", "First", 100, 0),
            ],
        );
        let mut selections = Selections::new();
        try_select(&catalog, &mut selections, "b", ExtraChoice::Toggled).unwrap();
        try_select(&catalog, &mut selections, "a", ExtraChoice::Toggled).unwrap();

        let priced = price_line(&product(0), &catalog, &selections, 1);
        let names: Vec<&str> = priced.extras.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_snapshot_round_trip_reproduces_total() {
        let catalog = ExtrasCatalog::new(
            vec![group("g1", 0)],
            vec![
                flat("e1", "g1", "Bacon", 800, 0),
                flat("e2", "g1", "Huevo", 300, 1),
            ],
        );
        let mut selections = Selections::new();
        try_select(&catalog, &mut selections, "e1", ExtraChoice::Toggled).unwrap();
        try_select(&catalog, &mut selections, "e2", ExtraChoice::Toggled).unwrap();

        let priced = price_line(&product(2500), &catalog, &selections, 3);

        // Re-derived from the snapshot alone, independent of later catalog
        // mutation.
        assert_eq!(
            priced.total_from_snapshot(2500, 3),
            priced.line_total_cents
        );
    }

    #[test]
    fn test_invalid_inputs_treated_as_zero() {
        let catalog = ExtrasCatalog::new(
            vec![group("g1", 0)],
            vec![flat("e1", "g1", "Broken", -400, 0)],
        );
        let mut selections = Selections::new();
        try_select(&catalog, &mut selections, "e1", ExtraChoice::Toggled).unwrap();

        let priced = price_line(&product(-1000), &catalog, &selections, 2);

        assert_eq!(priced.unit_price_cents, 0);
        assert_eq!(priced.line_total_cents, 0);
        assert_eq!(priced.extras[0].price_cents, 0);
    }
}
