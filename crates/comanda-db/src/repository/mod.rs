//! # Repository Layer
//!
//! Repository implementations for database access.
//!
//! ## Pattern
//! Each repository owns a pool handle and exposes focused async methods.
//! Domain types come from `comanda-core`; row structs stay private to each
//! module and convert via `From` impls.
//!
//! - [`catalog`] - Products, categories, extras groups, extras
//! - [`order`] - Orders and immutable line-item snapshots
//! - [`config`] - Delivery-type toggles and storefront pause
//! - [`paid`] - Manual-payment paid flags

pub mod catalog;
pub mod config;
pub mod order;
pub mod paid;
