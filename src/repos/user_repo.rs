/*
 * Responsibility
 * - Read-only SQLx access to users and their login tokens
 * - Only hashed tokens ever reach this layer
 */
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool, types::Json};

use crate::repos::error::{RepoError, RepoResult};

#[derive(Clone, Debug)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the account owning a login token with `hashed_token`, together with
    /// all of its login tokens, in a single round trip.
    pub async fn find_by_hashed_token(
        &self,
        hashed_token: &str,
    ) -> RepoResult<Option<UserAccountRow>> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT
                u."userId",
                u."userName",
                u."createdAt",
                COALESCE(
                    json_agg(
                        json_build_object('hashedToken', t."hashedToken", 'when', t."when")
                    ) FILTER (WHERE t."hashedToken" IS NOT NULL),
                    '[]'::json
                ) AS "loginTokens"
            FROM users u
            LEFT JOIN login_tokens t ON t."userId" = u."userId"
            WHERE u."userId" = (
                SELECT "userId" FROM login_tokens WHERE "hashedToken" = $1 LIMIT 1
            )
            GROUP BY u."userId"
            "#,
        )
        .bind(hashed_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(row)
    }

    // Liveness probe for /health.
    pub async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserAccountRow {
    #[sqlx(rename = "userId")]
    pub id: String,

    #[sqlx(rename = "userName")]
    pub user_name: Option<String>,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "loginTokens")]
    pub login_tokens: Json<Vec<LoginTokenRow>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginTokenRow {
    #[serde(rename = "hashedToken")]
    pub hashed_token: String,
    pub when: DateTime<Utc>,
}
