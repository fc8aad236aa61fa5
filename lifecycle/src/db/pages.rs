/// Page record operations
///
/// This module manages the host's `pages` rows on behalf of plugin
/// installation. A page is keyed by `(creator_id, route)`, so page creation
/// checks the route first and installation stays idempotent per user.
use anyhow::{Context, Result};
use sdk::page::PageContent;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::now_timestamp;

/// Repository for host page rows
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    /// Create a new page repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a page id by creator and route
    pub async fn find_by_route(&self, creator_id: &str, route: &str) -> Result<Option<String>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM pages WHERE creator_id = ? AND route = ?")
                .bind(creator_id)
                .bind(route)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch page by route")?;

        Ok(id)
    }

    /// Insert a published page and return its id
    ///
    /// Page ids are 32-character lowercase hex, matching the host's id
    /// scheme. The page is published immediately so it appears in the user's
    /// navigation without an extra step.
    pub async fn insert_page(
        &self,
        creator_id: &str,
        name: &str,
        route: &str,
        content: &PageContent,
    ) -> Result<String> {
        let page_id = Uuid::new_v4().simple().to_string();
        let now = now_timestamp();
        let content_json = content.to_json().context("Failed to serialize page content")?;

        sqlx::query(
            "INSERT INTO pages (id, name, route, content, creator_id, created_at, updated_at, is_published, publish_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&page_id)
        .bind(name)
        .bind(route)
        .bind(&content_json)
        .bind(creator_id)
        .bind(&now)
        .bind(&now)
        .bind(true)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Failed to insert page record")?;

        Ok(page_id)
    }

    /// Delete a page by creator and route, returning the row count
    ///
    /// Zero rows is not an error: uninstall proceeds even when the user
    /// already removed the page by hand.
    pub async fn delete_by_route(&self, creator_id: &str, route: &str) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM pages WHERE creator_id = ? AND route = ?")
            .bind(creator_id)
            .bind(route)
            .execute(&self.pool)
            .await
            .context("Failed to delete page record")?
            .rows_affected();

        Ok(deleted)
    }
}
