//! Database operations for the append-only `contact_messages` table.

use chrono::{DateTime, Utc};
use mtlresto_core::{ContactForm, ContactMessage};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `contact_messages` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactMessageRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(row: ContactMessageRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            received_at: row.received_at,
        }
    }
}

/// Appends one message. `received_at` is set by the database clock.
///
/// Callers validate the form first; this function stores whatever it is
/// given, trimmed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_contact_message(
    pool: &PgPool,
    form: &ContactForm,
) -> Result<ContactMessage, DbError> {
    let row = sqlx::query_as::<_, ContactMessageRow>(
        "INSERT INTO contact_messages (name, email, message) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, email, message, received_at",
    )
    .bind(form.name.trim())
    .bind(form.email.trim())
    .bind(form.message.trim())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Most recent messages first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_contact_messages(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ContactMessage>, DbError> {
    let rows = sqlx::query_as::<_, ContactMessageRow>(
        "SELECT id, name, email, message, received_at \
         FROM contact_messages \
         ORDER BY received_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ContactMessage::from).collect())
}
