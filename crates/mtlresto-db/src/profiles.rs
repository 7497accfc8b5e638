//! Database operations for the `user_profiles` table.

use chrono::{DateTime, Utc};
use mtlresto_core::UserProfile;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            profile_image: row.profile_image,
        }
    }
}

/// Loads the profile document for `user_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_profile(pool: &PgPool, user_id: &str) -> Result<UserProfile, DbError> {
    let row = sqlx::query_as::<_, UserProfileRow>(
        "SELECT user_id, first_name, last_name, email, phone, address, profile_image, \
                created_at, updated_at \
         FROM user_profiles \
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(UserProfile::from).ok_or(DbError::NotFound)
}

/// Overwrites the stored document for `profile.user_id` with `profile`.
///
/// Creates the row if it does not exist yet. `email` is written only on
/// insert; an existing row keeps its email. Returns the document as stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn save_profile(pool: &PgPool, profile: &UserProfile) -> Result<UserProfile, DbError> {
    let row = sqlx::query_as::<_, UserProfileRow>(
        "INSERT INTO user_profiles \
             (user_id, first_name, last_name, email, phone, address, profile_image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
             first_name    = EXCLUDED.first_name, \
             last_name     = EXCLUDED.last_name, \
             phone         = EXCLUDED.phone, \
             address       = EXCLUDED.address, \
             profile_image = EXCLUDED.profile_image, \
             updated_at    = NOW() \
         RETURNING user_id, first_name, last_name, email, phone, address, profile_image, \
                   created_at, updated_at",
    )
    .bind(&profile.user_id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.address)
    .bind(&profile.profile_image)
    .fetch_one(pool)
    .await?;

    tracing::debug!(user_id = %row.user_id, "saved profile");
    Ok(row.into())
}
