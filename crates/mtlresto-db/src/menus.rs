//! Database operations for `restaurants` and `menu_items`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mtlresto_core::{MenuItem, MenuStatus, RestaurantMenu};
use sqlx::PgPool;

use crate::DbError;

/// Items written per `INSERT` statement.
pub const MENU_ITEM_BATCH_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub menu_status: String,
    pub external_menu_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestaurantRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidData`] for a status outside the schema's
    /// `CHECK` constraint.
    pub fn status(&self) -> Result<MenuStatus, DbError> {
        match self.menu_status.as_str() {
            "internal" => Ok(MenuStatus::Internal),
            "external" => Ok(MenuStatus::External),
            "not_available" => Ok(MenuStatus::NotAvailable),
            other => Err(DbError::InvalidData(format!("menu_status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItemRow {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: String,
    pub description: String,
    pub section: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts or updates the restaurant document for `menu.name`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_restaurant(
    pool: &PgPool,
    menu: &RestaurantMenu,
) -> Result<RestaurantRow, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(
        "INSERT INTO restaurants (name, menu_status, external_menu_url) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (name) DO UPDATE SET \
             menu_status       = EXCLUDED.menu_status, \
             external_menu_url = EXCLUDED.external_menu_url, \
             updated_at        = NOW() \
         RETURNING id, name, menu_status, external_menu_url, created_at, updated_at",
    )
    .bind(&menu.name)
    .bind(menu.status.as_str())
    .bind(&menu.external_menu_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Writes `items` under `restaurant_id`, [`MENU_ITEM_BATCH_SIZE`] rows per
/// statement. Items are keyed by name; a later item with the same name
/// replaces an earlier one.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any batch fails. Batches already written
/// stay written.
pub async fn insert_menu_items(
    pool: &PgPool,
    restaurant_id: i64,
    items: &[MenuItem],
) -> Result<u64, DbError> {
    let items = dedupe_by_name(items);
    let mut written = 0u64;

    for batch in items.chunks(MENU_ITEM_BATCH_SIZE) {
        let mut names = Vec::with_capacity(batch.len());
        let mut prices = Vec::with_capacity(batch.len());
        let mut descriptions = Vec::with_capacity(batch.len());
        let mut sections = Vec::with_capacity(batch.len());
        for item in batch {
            names.push(item.name.as_str());
            prices.push(item.price.as_str());
            descriptions.push(item.description.as_str());
            sections.push(item.section.as_str());
        }

        let result = sqlx::query(
            "INSERT INTO menu_items (restaurant_id, name, price, description, section) \
             SELECT $1, * FROM UNNEST($2::text[], $3::text[], $4::text[], $5::text[]) \
             ON CONFLICT (restaurant_id, name) DO UPDATE SET \
                 price       = EXCLUDED.price, \
                 description = EXCLUDED.description, \
                 section     = EXCLUDED.section, \
                 updated_at  = NOW()",
        )
        .bind(restaurant_id)
        .bind(&names)
        .bind(&prices)
        .bind(&descriptions)
        .bind(&sections)
        .execute(pool)
        .await?;

        written += result.rows_affected();
        tracing::debug!(restaurant_id, batch = batch.len(), "wrote menu item batch");
    }

    Ok(written)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_restaurant_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<RestaurantRow>, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(
        "SELECT id, name, menu_status, external_menu_url, created_at, updated_at \
         FROM restaurants \
         WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_menu_items(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Vec<MenuItemRow>, DbError> {
    let rows = sqlx::query_as::<_, MenuItemRow>(
        "SELECT id, restaurant_id, name, price, description, section \
         FROM menu_items \
         WHERE restaurant_id = $1 \
         ORDER BY section, name",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// One `ON CONFLICT DO UPDATE` statement cannot touch the same row twice, so
/// duplicates are collapsed up front (last one wins, first position kept).
fn dedupe_by_name(items: &[MenuItem]) -> Vec<&MenuItem> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<&MenuItem> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(&pos) = positions.get(item.name.as_str()) {
            out[pos] = item;
        } else {
            positions.insert(item.name.as_str(), out.len());
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: &str) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            price: price.to_string(),
            description: "No description".to_string(),
            section: "Main".to_string(),
        }
    }

    #[test]
    fn dedupe_keeps_last_value_at_first_position() {
        let items = vec![item("Poutine", "$9"), item("Bagel", "$2"), item("Poutine", "$11")];
        let deduped = dedupe_by_name(&items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].name, "Poutine");
        assert_eq!(deduped[0].price, "$11");
        assert_eq!(deduped[1].name, "Bagel");
    }

    #[test]
    fn unknown_status_is_invalid_data() {
        let row = RestaurantRow {
            id: 1,
            name: "X".to_string(),
            menu_status: "closed".to_string(),
            external_menu_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(row.status(), Err(DbError::InvalidData(_))));
    }
}
