//! # Stock Governor
//!
//! Computes the effective purchasable quantity for a product by combining
//! the product's own stock ceiling with its category's shared ceiling and
//! the quantity already reserved in the current cart.
//!
//! ## Algorithm
//! ```text
//! productCeiling  = product.stock        ?? ∞
//! categoryCeiling = category.current_stock ?? ∞   (shared across category)
//! rawLimit        = min(productCeiling, categoryCeiling)
//! reserved        = editing existing line ? 0 : quantity already in cart
//! effectiveLimit  = max(0, rawLimit − reserved)   (∞ stays ∞)
//! ```
//!
//! Stock is advisory at cart-build time: the engine does NOT decrement
//! durable inventory on add-to-cart. The order-creation boundary is the
//! sole point of truth and re-checks stock with conditional decrements, so
//! these predicates are idempotent and safely re-runnable there.

use serde::{Deserialize, Serialize};

use crate::types::{Category, Product};

// =============================================================================
// Stock Limit
// =============================================================================

/// A purchasable quantity: a finite ceiling or unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLimit {
    /// No ceiling applies.
    Unlimited,
    /// At most this many units (never negative).
    Limited(i64),
}

impl StockLimit {
    /// The tighter of two limits.
    pub fn min(self, other: StockLimit) -> StockLimit {
        match (self, other) {
            (StockLimit::Unlimited, other) => other,
            (limit, StockLimit::Unlimited) => limit,
            (StockLimit::Limited(a), StockLimit::Limited(b)) => StockLimit::Limited(a.min(b)),
        }
    }

    /// Whether the given quantity fits within the limit.
    pub fn allows(&self, quantity: i64) -> bool {
        match self {
            StockLimit::Unlimited => true,
            StockLimit::Limited(max) => quantity <= *max,
        }
    }

    /// The finite ceiling, if any.
    pub fn ceiling(&self) -> Option<i64> {
        match self {
            StockLimit::Unlimited => None,
            StockLimit::Limited(max) => Some(*max),
        }
    }

    fn minus(self, reserved: i64) -> StockLimit {
        match self {
            StockLimit::Unlimited => StockLimit::Unlimited,
            StockLimit::Limited(max) => StockLimit::Limited((max - reserved).max(0)),
        }
    }

    fn from_option(stock: Option<i64>) -> StockLimit {
        match stock {
            None => StockLimit::Unlimited,
            Some(n) => StockLimit::Limited(n.max(0)),
        }
    }
}

// =============================================================================
// Governor
// =============================================================================

/// The combined product + category ceiling, ignoring cart state.
pub fn raw_limit(product: &Product, category: Option<&Category>) -> StockLimit {
    let product_ceiling = StockLimit::from_option(product.stock);
    let category_ceiling = StockLimit::from_option(category.and_then(|c| c.current_stock));
    product_ceiling.min(category_ceiling)
}

/// The effective purchasable quantity after subtracting what the cart
/// already holds.
///
/// ## Arguments
/// * `cart_quantity_held` - units of this product already in the cart
/// * `is_editing_existing_line` - editing a line does not double-count its
///   own already-held quantity; the reserved count is zeroed
pub fn effective_limit(
    product: &Product,
    category: Option<&Category>,
    cart_quantity_held: i64,
    is_editing_existing_line: bool,
) -> StockLimit {
    let reserved = if is_editing_existing_line {
        0
    } else {
        cart_quantity_held
    };
    raw_limit(product, category).minus(reserved)
}

/// A globally sold-out item is out of stock even in an empty cart.
pub fn is_out_of_stock(product: &Product, category: Option<&Category>) -> bool {
    raw_limit(product, category) == StockLimit::Limited(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: Option<i64>) -> Product {
        Product {
            id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Lomito".to_string(),
            description: None,
            price_cents: 2500,
            stock,
            category_id: Some("c1".to_string()),
            extra_group_ids: vec![],
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn category(current_stock: Option<i64>) -> Category {
        Category {
            id: "c1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Sandwiches".to_string(),
            max_stock: current_stock,
            current_stock,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_limit_combines_ceilings_and_reservation() {
        // product stock 5, category 3, cart holds 2 → limit 1
        let p = product(Some(5));
        let c = category(Some(3));

        assert_eq!(
            effective_limit(&p, Some(&c), 2, false),
            StockLimit::Limited(1)
        );
    }

    #[test]
    fn test_effective_limit_never_exceeds_raw_limit() {
        let p = product(Some(5));
        let c = category(Some(3));

        for held in 0..10 {
            let limit = effective_limit(&p, Some(&c), held, false);
            let raw = raw_limit(&p, Some(&c));
            if let (Some(eff), Some(raw)) = (limit.ceiling(), raw.ceiling()) {
                assert!(eff <= raw);
                assert!(eff >= 0);
            }
        }
    }

    #[test]
    fn test_unlimited_when_no_ceilings() {
        let p = product(None);
        assert_eq!(effective_limit(&p, None, 50, false), StockLimit::Unlimited);
        assert!(!is_out_of_stock(&p, None));
    }

    #[test]
    fn test_category_alone_constrains() {
        let p = product(None);
        let c = category(Some(4));

        assert_eq!(raw_limit(&p, Some(&c)), StockLimit::Limited(4));
    }

    #[test]
    fn test_editing_ignores_own_reservation() {
        let p = product(Some(5));

        // Editing an existing line: the reserved count is zeroed, so the
        // full raw limit is available.
        assert_eq!(effective_limit(&p, None, 5, true), StockLimit::Limited(5));
        assert_eq!(effective_limit(&p, None, 5, false), StockLimit::Limited(0));
    }

    #[test]
    fn test_out_of_stock_regardless_of_cart() {
        let p = product(Some(0));
        assert!(is_out_of_stock(&p, None));

        let p = product(Some(2));
        let c = category(Some(0));
        assert!(is_out_of_stock(&p, Some(&c)));

        // Held quantity alone never makes a product "out of stock".
        let p = product(Some(2));
        assert!(!is_out_of_stock(&p, None));
        assert_eq!(effective_limit(&p, None, 2, false), StockLimit::Limited(0));
    }

    #[test]
    fn test_allows() {
        assert!(StockLimit::Unlimited.allows(1_000_000));
        assert!(StockLimit::Limited(3).allows(3));
        assert!(!StockLimit::Limited(3).allows(4));
    }
}
