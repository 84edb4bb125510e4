//! Repositories for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Sel3a, Sel3aListItem};

pub mod ledger;

/// Inventory item repository
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Create a new item repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all items, newest first, with the creator's display name
    /// joined in
    pub async fn list(&self) -> Result<Vec<Sel3aListItem>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.price, s.quantity, s.added_by, u.name AS added_by_name
            FROM sel3a s
            LEFT JOIN users u ON s.added_by = u.email
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| Sel3aListItem {
                id: row.get("id"),
                name: row.get("name"),
                price: row.get("price"),
                quantity: row.get("quantity"),
                added_by: row.get("added_by"),
                added_by_name: row.get("added_by_name"),
            })
            .collect();

        Ok(items)
    }

    /// Find an item by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Sel3a>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, quantity, added_by, created_at
            FROM sel3a
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Sel3a {
            id: row.get("id"),
            name: row.get("name"),
            price: row.get("price"),
            quantity: row.get("quantity"),
            added_by: row.get("added_by"),
            created_at: row.get("created_at"),
        }))
    }

    /// Create a new item owned by the acting identity
    pub async fn create(
        &self,
        name: &str,
        price: f64,
        quantity: i32,
        added_by: &str,
    ) -> Result<Sel3a> {
        let row = sqlx::query(
            r#"
            INSERT INTO sel3a (name, price, quantity, added_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, quantity, added_by, created_at
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(quantity)
        .bind(added_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(Sel3a {
            id: row.get("id"),
            name: row.get("name"),
            price: row.get("price"),
            quantity: row.get("quantity"),
            added_by: row.get("added_by"),
            created_at: row.get("created_at"),
        })
    }

    /// Overwrite an item's name, price, and quantity
    pub async fn update(&self, id: Uuid, name: &str, price: f64, quantity: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sel3a
            SET name = $1, price = $2, quantity = $3
            WHERE id = $4
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(quantity)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an item by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sel3a WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
