//! # Catalog Repository
//!
//! Database operations for the storefront catalog: categories, products,
//! extras groups and extras.
//!
//! ## Soft Deletion
//! Catalog rows are never deleted, only flagged `is_active = 0`. Orders keep
//! their snapshots, so history survives catalog edits; list methods return
//! active rows only, while point lookups return inactive rows too (an order
//! detail view may still need them).
//!
//! ## Options Column
//! Options-bearing extras store their variants as a JSON array in the
//! `options` column. The row structs keep the raw TEXT and conversion to
//! [`Extra`] decodes it, so a malformed payload surfaces as
//! `DbError::InvalidPayload` instead of a silent empty list.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use comanda_core::{Category, Extra, ExtraGroup, ExtrasCatalog, Product};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    tenant_id: String,
    name: String,
    max_stock: Option<i64>,
    current_stock: Option<i64>,
    sort_order: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            max_stock: row.max_stock,
            current_stock: row.current_stock,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    tenant_id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: Option<i64>,
    category_id: Option<String>,
    sort_order: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Links come from `product_extra_groups` in a separate query.
    fn into_product(self, extra_group_ids: Vec<String>) -> Product {
        Product {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            stock: self.stock,
            category_id: self.category_id,
            extra_group_ids,
            sort_order: self.sort_order,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExtraGroupRow {
    id: String,
    tenant_id: String,
    name: String,
    min_selections: i64,
    max_selections: i64,
    is_required: bool,
    sort_order: i64,
    is_active: bool,
}

impl From<ExtraGroupRow> for ExtraGroup {
    fn from(row: ExtraGroupRow) -> Self {
        ExtraGroup {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            min_selections: row.min_selections,
            max_selections: row.max_selections,
            is_required: row.is_required,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExtraRow {
    id: String,
    group_id: String,
    name: String,
    price_cents: i64,
    has_options: bool,
    options: String,
    sort_order: i64,
    is_active: bool,
}

impl TryFrom<ExtraRow> for Extra {
    type Error = DbError;

    fn try_from(row: ExtraRow) -> DbResult<Self> {
        Ok(Extra {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            price_cents: row.price_cents,
            has_options: row.has_options,
            options: serde_json::from_str(&row.options)?,
            sort_order: row.sort_order,
            is_active: row.is_active,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Inserts a category.
    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, tenant_id, name, max_stock, current_stock,
                sort_order, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&category.id)
        .bind(&category.tenant_id)
        .bind(&category.name)
        .bind(category.max_stock)
        .bind(category.current_stock)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a category's editable fields.
    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                max_stock = ?3,
                current_stock = ?4,
                sort_order = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.max_stock)
        .bind(category.current_stock)
        .bind(category.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        Ok(())
    }

    /// Soft-deletes a category.
    pub async fn deactivate_category(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE categories SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Gets a category by ID, active or not.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT * FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Category::from))
    }

    /// Lists active categories for a tenant in display order.
    pub async fn list_categories(&self, tenant_id: &str) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT * FROM categories
            WHERE tenant_id = ?1 AND is_active = 1
            ORDER BY sort_order, name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Inserts a product and its extras-group links.
    pub async fn insert_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, description, price_cents, stock,
                category_id, sort_order, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(product.sort_order)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        for (i, group_id) in product.extra_group_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_extra_groups (product_id, group_id, sort_order)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&product.id)
            .bind(group_id)
            .bind(i as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Updates a product's editable fields and replaces its group links.
    pub async fn update_product(&self, product: &Product) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                category_id = ?6,
                sort_order = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(product.sort_order)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        sqlx::query("DELETE FROM product_extra_groups WHERE product_id = ?1")
            .bind(&product.id)
            .execute(&mut *tx)
            .await?;

        for (i, group_id) in product.extra_group_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_extra_groups (product_id, group_id, sort_order)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&product.id)
            .bind(group_id)
            .bind(i as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-deletes a product.
    pub async fn deactivate_product(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Gets a product by ID, active or not, with its group links.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let group_ids = self.group_ids_of(&row.id).await?;
        Ok(Some(row.into_product(group_ids)))
    }

    /// Lists active products for a tenant in display order.
    pub async fn list_products(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT * FROM products
            WHERE tenant_id = ?1 AND is_active = 1
            ORDER BY sort_order, name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let group_ids = self.group_ids_of(&row.id).await?;
            products.push(row.into_product(group_ids));
        }

        Ok(products)
    }

    /// Overwrites the product's stock counter. `None` means unlimited.
    pub async fn set_product_stock(&self, id: &str, stock: Option<i64>) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(stock)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Resets a category's shared counter back to its ceiling.
    ///
    /// Used by the daily replenish flow. No-op on unlimited categories.
    pub async fn replenish_category_stock(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories SET current_stock = max_stock, updated_at = ?2
            WHERE id = ?1 AND max_stock IS NOT NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    async fn group_ids_of(&self, product_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT group_id FROM product_extra_groups
            WHERE product_id = ?1
            ORDER BY sort_order
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    // -------------------------------------------------------------------------
    // Extras Groups + Extras
    // -------------------------------------------------------------------------

    /// Inserts an extras group.
    pub async fn insert_group(&self, group: &ExtraGroup) -> DbResult<()> {
        debug!(id = %group.id, name = %group.name, "Inserting extras group");

        sqlx::query(
            r#"
            INSERT INTO extra_groups (
                id, tenant_id, name, min_selections, max_selections,
                is_required, sort_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&group.id)
        .bind(&group.tenant_id)
        .bind(&group.name)
        .bind(group.min_selections)
        .bind(group.max_selections)
        .bind(group.is_required)
        .bind(group.sort_order)
        .bind(group.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an extras group's rules and display fields.
    pub async fn update_group(&self, group: &ExtraGroup) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE extra_groups SET
                name = ?2,
                min_selections = ?3,
                max_selections = ?4,
                is_required = ?5,
                sort_order = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&group.id)
        .bind(&group.name)
        .bind(group.min_selections)
        .bind(group.max_selections)
        .bind(group.is_required)
        .bind(group.sort_order)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExtraGroup", &group.id));
        }

        Ok(())
    }

    /// Soft-deletes an extras group.
    pub async fn deactivate_group(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE extra_groups SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExtraGroup", id));
        }

        Ok(())
    }

    /// Inserts an extra. Options serialize to the JSON column.
    pub async fn insert_extra(&self, extra: &Extra) -> DbResult<()> {
        debug!(id = %extra.id, name = %extra.name, "Inserting extra");

        let options = serde_json::to_string(&extra.options)?;

        sqlx::query(
            r#"
            INSERT INTO extras (
                id, group_id, name, price_cents, has_options,
                options, sort_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&extra.id)
        .bind(&extra.group_id)
        .bind(&extra.name)
        .bind(extra.price_cents)
        .bind(extra.has_options)
        .bind(options)
        .bind(extra.sort_order)
        .bind(extra.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an extra, replacing its options payload.
    pub async fn update_extra(&self, extra: &Extra) -> DbResult<()> {
        let options = serde_json::to_string(&extra.options)?;

        let result = sqlx::query(
            r#"
            UPDATE extras SET
                name = ?2,
                price_cents = ?3,
                has_options = ?4,
                options = ?5,
                sort_order = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&extra.id)
        .bind(&extra.name)
        .bind(extra.price_cents)
        .bind(extra.has_options)
        .bind(options)
        .bind(extra.sort_order)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Extra", &extra.id));
        }

        Ok(())
    }

    /// Soft-deletes an extra.
    pub async fn deactivate_extra(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE extras SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Extra", id));
        }

        Ok(())
    }

    /// Loads every active extras group and extra for a tenant.
    ///
    /// The returned [`ExtrasCatalog`] is what pricing and validation run
    /// against; group links on each product narrow it per product.
    pub async fn load_catalog(&self, tenant_id: &str) -> DbResult<ExtrasCatalog> {
        let group_rows: Vec<ExtraGroupRow> = sqlx::query_as(
            r#"
            SELECT * FROM extra_groups
            WHERE tenant_id = ?1 AND is_active = 1
            ORDER BY sort_order
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let extra_rows: Vec<ExtraRow> = sqlx::query_as(
            r#"
            SELECT e.* FROM extras e
            JOIN extra_groups g ON g.id = e.group_id
            WHERE g.tenant_id = ?1 AND e.is_active = 1 AND g.is_active = 1
            ORDER BY e.sort_order
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let groups = group_rows.into_iter().map(ExtraGroup::from).collect();
        let extras = extra_rows
            .into_iter()
            .map(Extra::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(ExtrasCatalog::new(groups, extras))
    }
}

/// Generates a new catalog entity ID.
pub fn generate_catalog_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
