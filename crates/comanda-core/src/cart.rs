//! # Cart Store
//!
//! An ordered collection of line items with validated mutation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Cart Store Operations                           │
//! │                                                                     │
//! │  Caller Action            Operation              Cart Change        │
//! │  ─────────────            ─────────              ───────────        │
//! │                                                                     │
//! │  Confirm product detail ► add() ───────────────► lines.push(line)   │
//! │                                                                     │
//! │  Quantity stepper + ────► increment() ─────────► line.quantity += 1 │
//! │                                                                     │
//! │  Quantity stepper − ────► decrement() ─────────► qty 0 ⇒ removed    │
//! │                                                                     │
//! │  Re-open line editor ───► edit() ──────────────► re-validate + price│
//! │                                                                     │
//! │  Click Clear ───────────► clear() ─────────────► lines.clear()      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every `add` creates a NEW line; lines are never merged, so extras and
//!   comments stay individually editable. Quantity steppers mutate an
//!   existing line only.
//! - No line ever has quantity 0: decrementing to 0 removes the line.
//! - Every mutation re-validates against the selection rules and the stock
//!   governor before taking effect; a rejection is a no-op with a reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ExtrasCatalog;
use crate::error::{CoreError, CoreResult};
use crate::pricing::price_line;
use crate::selection::{all_groups_valid, first_unmet_group, Selections};
use crate::stock::effective_limit;
use crate::types::{Category, ExtraChoiceSnapshot, Product};
use crate::{MAX_CART_LINES, MAX_COMMENT_LEN, MAX_LINE_QUANTITY};

// =============================================================================
// Product Context
// =============================================================================

/// Everything the cart needs to validate and price one product:
/// the product itself, its category (for the shared stock pool), and the
/// extras catalog scoped to the product's groups.
#[derive(Debug, Clone, Copy)]
pub struct ProductContext<'a> {
    pub product: &'a Product,
    pub category: Option<&'a Category>,
    pub catalog: &'a ExtrasCatalog,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One entry in the cart: a product configuration at a given quantity.
///
/// Product name and extras prices are frozen at composition time; the
/// `selections` are kept alongside so the line can be re-opened for editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identity (UUID v4); distinct lines of the same product keep
    /// distinct ids.
    pub line_id: String,
    pub product_id: String,
    /// Product name at add time (frozen).
    pub name: String,
    /// Base price + extras at add time (frozen), in cents.
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Frozen extras entries, order-stable.
    pub extras: Vec<ExtraChoiceSnapshot>,
    /// The live selection set, retained for re-editing.
    pub selections: Selections,
    pub comment: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// unit price × quantity, in cents.
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart: an ordered list of validated lines.
///
/// Mutations are applied in invocation order: the cart is a single
/// in-memory structure mutated synchronously between suspension points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a new line after validating selections, quantity, and stock.
    ///
    /// Always appends a new line, even for a product already in the cart.
    ///
    /// ## Returns
    /// The appended line on success; a specific [`CoreError`] reason on
    /// rejection (the cart is left untouched).
    pub fn add(
        &mut self,
        ctx: ProductContext<'_>,
        selections: Selections,
        quantity: i64,
        comment: Option<String>,
    ) -> CoreResult<&CartLine> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        self.validate(ctx, &selections, quantity, &comment, false)?;

        let priced = price_line(ctx.product, ctx.catalog, &selections, quantity);
        self.lines.push(CartLine {
            line_id: Uuid::new_v4().to_string(),
            product_id: ctx.product.id.clone(),
            name: ctx.product.name.clone(),
            unit_price_cents: priced.unit_price_cents,
            quantity,
            extras: priced.extras,
            selections,
            comment,
            added_at: Utc::now(),
        });

        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Re-validates and re-prices an existing line with new selections and
    /// quantity. The line's own held quantity is not counted against it.
    pub fn edit(
        &mut self,
        line_id: &str,
        ctx: ProductContext<'_>,
        selections: Selections,
        quantity: i64,
        comment: Option<String>,
    ) -> CoreResult<&CartLine> {
        let index = self.index_of(line_id)?;
        self.validate(ctx, &selections, quantity, &comment, true)?;

        let priced = price_line(ctx.product, ctx.catalog, &selections, quantity);
        let line = &mut self.lines[index];
        line.unit_price_cents = priced.unit_price_cents;
        line.extras = priced.extras;
        line.selections = selections;
        line.quantity = quantity;
        line.comment = comment;

        Ok(&self.lines[index])
    }

    /// Increments a line's quantity by one, re-checking the stock limit.
    pub fn increment(&mut self, line_id: &str, ctx: ProductContext<'_>) -> CoreResult<i64> {
        let index = self.index_of(line_id)?;
        let new_quantity = self.lines[index].quantity + 1;

        if new_quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                requested: new_quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        self.check_stock(ctx, new_quantity, true)?;

        self.lines[index].quantity = new_quantity;
        Ok(new_quantity)
    }

    /// Decrements a line's quantity by one. Reaching 0 removes the line
    /// entirely; the cart never keeps a zero-quantity line.
    ///
    /// ## Returns
    /// The remaining quantity (0 when the line was removed).
    pub fn decrement(&mut self, line_id: &str) -> CoreResult<i64> {
        let index = self.index_of(line_id)?;
        let line = &mut self.lines[index];
        line.quantity -= 1;

        if line.quantity <= 0 {
            self.lines.remove(index);
            return Ok(0);
        }
        Ok(self.lines[index].quantity)
    }

    /// Removes a line.
    pub fn remove(&mut self, line_id: &str) -> CoreResult<()> {
        let index = self.index_of(line_id)?;
        self.lines.remove(index);
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // -------------------------------------------------------------------------
    // Selectors
    // -------------------------------------------------------------------------

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// A line by id.
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// Total quantity across all lines (Σ quantity).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Cart total in cents (Σ line totals).
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of one product already held across all lines, the
    /// "reserved" input to the stock governor.
    pub fn held_quantity(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn index_of(&self, line_id: &str) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }

    fn validate(
        &self,
        ctx: ProductContext<'_>,
        selections: &Selections,
        quantity: i64,
        comment: &Option<String>,
        is_editing: bool,
    ) -> CoreResult<()> {
        if quantity < 1 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if !ctx.product.is_active {
            return Err(CoreError::InactiveProduct(ctx.product.name.clone()));
        }
        if let Some(comment) = comment {
            if comment.chars().count() > MAX_COMMENT_LEN {
                return Err(CoreError::CommentTooLong {
                    max: MAX_COMMENT_LEN,
                });
            }
        }
        if !all_groups_valid(ctx.catalog, selections) {
            // Report the specific group that failed.
            if let Some((group, selected)) = first_unmet_group(ctx.catalog, selections) {
                return Err(CoreError::GroupRequirementUnmet {
                    group: group.name.clone(),
                    min: group.min_selections,
                    selected,
                });
            }
        }
        self.check_stock(ctx, quantity, is_editing)
    }

    fn check_stock(
        &self,
        ctx: ProductContext<'_>,
        quantity: i64,
        is_editing: bool,
    ) -> CoreResult<()> {
        let held = self.held_quantity(&ctx.product.id);
        let limit = effective_limit(ctx.product, ctx.category, held, is_editing);

        if !limit.allows(quantity) {
            return Err(CoreError::InsufficientStock {
                product: ctx.product.name.clone(),
                available: limit.ceiling().unwrap_or(0),
                requested: quantity,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
