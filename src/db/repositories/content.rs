//! Content repository
//!
//! Database operations for content associations and the four polymorphic
//! item tables. The `(item_kind, item_id)` pair carries no foreign key, so
//! every write that touches an item row and its association runs in one
//! transaction, and deletes renumber the module's surviving contents.

use crate::models::{
    Content, ContentItem, ContentKind, ContentWithItem, FileItem, ImageItem, TextItem, VideoItem,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

/// Content repository trait
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Get an association row by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Content>>;

    /// List a module's contents with their items resolved, ordered by position
    async fn list_by_module(&self, module_id: i64) -> Result<Vec<ContentWithItem>>;

    /// Get an item row by kind and ID
    async fn get_item(&self, kind: ContentKind, item_id: i64) -> Result<Option<ContentItem>>;

    /// Create an item and its association, appended at the module's tail
    async fn create_item(
        &self,
        module_id: i64,
        kind: ContentKind,
        owner_id: i64,
        title: &str,
        payload: &str,
    ) -> Result<ContentWithItem>;

    /// Update an item's editable fields, returning the updated item
    async fn update_item(
        &self,
        kind: ContentKind,
        item_id: i64,
        title: &str,
        payload: &str,
    ) -> Result<Option<ContentItem>>;

    /// Delete an association and its item, renumbering the module's
    /// surviving contents. Returns false if the association does not exist.
    async fn delete(&self, content_id: i64) -> Result<bool>;
}

/// SQLx-based content repository implementation
pub struct SqlxContentRepository {
    pool: SqlitePool,
}

impl SqlxContentRepository {
    /// Create a new SQLx content repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ContentRepository> {
        Arc::new(Self::new(pool))
    }
}

/// The payload column of a kind's item table
fn payload_column(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Text => "body",
        ContentKind::Video => "url",
        ContentKind::Image => "image",
        ContentKind::File => "file",
    }
}

fn row_to_content(row: &SqliteRow) -> Result<Content> {
    let kind_str: String = row.get("item_kind");
    let item_kind = ContentKind::from_token(&kind_str)
        .with_context(|| format!("Unknown item kind in database: {}", kind_str))?;

    Ok(Content {
        id: row.get("id"),
        module_id: row.get("module_id"),
        item_kind,
        item_id: row.get("item_id"),
        sort_order: row.get("sort_order"),
    })
}

fn row_to_item(kind: ContentKind, row: &SqliteRow) -> ContentItem {
    let payload: String = row.get(payload_column(kind));
    let id = row.get("id");
    let owner_id = row.get("owner_id");
    let title = row.get("title");
    let created_at = row.get("created_at");
    let updated_at = row.get("updated_at");

    match kind {
        ContentKind::Text => ContentItem::Text(TextItem {
            id,
            owner_id,
            title,
            body: payload,
            created_at,
            updated_at,
        }),
        ContentKind::Video => ContentItem::Video(VideoItem {
            id,
            owner_id,
            title,
            url: payload,
            created_at,
            updated_at,
        }),
        ContentKind::Image => ContentItem::Image(ImageItem {
            id,
            owner_id,
            title,
            image: payload,
            created_at,
            updated_at,
        }),
        ContentKind::File => ContentItem::File(FileItem {
            id,
            owner_id,
            title,
            file: payload,
            created_at,
            updated_at,
        }),
    }
}

/// Renumber a module's contents contiguously from 0, preserving order
async fn renumber_module(tx: &mut Transaction<'_, Sqlite>, module_id: i64) -> Result<()> {
    let rows = sqlx::query("SELECT id FROM contents WHERE module_id = ? ORDER BY sort_order, id")
        .bind(module_id)
        .fetch_all(&mut **tx)
        .await
        .context("Failed to list contents for renumbering")?;

    for (index, row) in rows.iter().enumerate() {
        let id: i64 = row.get("id");
        sqlx::query("UPDATE contents SET sort_order = ? WHERE id = ?")
            .bind(index as i64)
            .bind(id)
            .execute(&mut **tx)
            .await
            .context("Failed to renumber content")?;
    }

    Ok(())
}

#[async_trait]
impl ContentRepository for SqlxContentRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Content>> {
        let row = sqlx::query(
            "SELECT id, module_id, item_kind, item_id, sort_order FROM contents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get content by ID")?;

        row.map(|r| row_to_content(&r)).transpose()
    }

    async fn list_by_module(&self, module_id: i64) -> Result<Vec<ContentWithItem>> {
        let rows = sqlx::query(
            "SELECT id, module_id, item_kind, item_id, sort_order
             FROM contents WHERE module_id = ? ORDER BY sort_order, id",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contents")?;

        let mut resolved = Vec::with_capacity(rows.len());
        for row in &rows {
            let content = row_to_content(row)?;
            let item = self
                .get_item(content.item_kind, content.item_id)
                .await?
                .with_context(|| {
                    format!(
                        "Dangling content {}: no {} item with ID {}",
                        content.id, content.item_kind, content.item_id
                    )
                })?;
            resolved.push(ContentWithItem { content, item });
        }

        Ok(resolved)
    }

    async fn get_item(&self, kind: ContentKind, item_id: i64) -> Result<Option<ContentItem>> {
        let sql = format!(
            "SELECT id, owner_id, title, {}, created_at, updated_at FROM {}_items WHERE id = ?",
            payload_column(kind),
            kind.as_str()
        );
        let row = sqlx::query(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to get {} item", kind))?;

        Ok(row.map(|r| row_to_item(kind, &r)))
    }

    async fn create_item(
        &self,
        module_id: i64,
        kind: ContentKind,
        owner_id: i64,
        title: &str,
        payload: &str,
    ) -> Result<ContentWithItem> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {}_items (owner_id, title, {}, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            kind.as_str(),
            payload_column(kind)
        );
        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(title)
            .bind(payload)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create {} item", kind))?;
        let item_id = result.last_insert_rowid();

        // Append at the module's tail
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 as next_order FROM contents WHERE module_id = ?",
        )
        .bind(module_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read max content order")?;
        let sort_order: i64 = row.get("next_order");

        let result = sqlx::query(
            "INSERT INTO contents (module_id, item_kind, item_id, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(module_id)
        .bind(kind.as_str())
        .bind(item_id)
        .bind(sort_order)
        .execute(&mut *tx)
        .await
        .context("Failed to create content association")?;
        let content_id = result.last_insert_rowid();

        tx.commit().await.context("Failed to commit content create")?;

        let item = self
            .get_item(kind, item_id)
            .await?
            .context("Created item not found")?;

        Ok(ContentWithItem {
            content: Content {
                id: content_id,
                module_id,
                item_kind: kind,
                item_id,
                sort_order,
            },
            item,
        })
    }

    async fn update_item(
        &self,
        kind: ContentKind,
        item_id: i64,
        title: &str,
        payload: &str,
    ) -> Result<Option<ContentItem>> {
        let sql = format!(
            "UPDATE {}_items SET title = ?, {} = ?, updated_at = ? WHERE id = ?",
            kind.as_str(),
            payload_column(kind)
        );
        let result = sqlx::query(&sql)
            .bind(title)
            .bind(payload)
            .bind(Utc::now())
            .bind(item_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update {} item", kind))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_item(kind, item_id).await
    }

    async fn delete(&self, content_id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT id, module_id, item_kind, item_id, sort_order FROM contents WHERE id = ?",
        )
        .bind(content_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get content for deletion")?;

        let content = match row {
            Some(r) => row_to_content(&r)?,
            None => return Ok(false),
        };

        let sql = format!("DELETE FROM {}_items WHERE id = ?", content.item_kind.as_str());
        sqlx::query(&sql)
            .bind(content.item_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete {} item", content.item_kind))?;

        sqlx::query("DELETE FROM contents WHERE id = ?")
            .bind(content_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete content association")?;

        renumber_module(&mut tx, content.module_id).await?;

        tx.commit().await.context("Failed to commit content delete")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CourseRepository, ModuleChanges, ModuleRepository, SqlxCourseRepository,
        SqlxModuleRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Course, User, UserRole};

    async fn setup() -> (SqlitePool, SqlxContentRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::new(pool.clone());
        let user = user_repo
            .create(&User::new(
                "sam".to_string(),
                "sam@example.com".to_string(),
                "hash".to_string(),
                UserRole::Instructor,
            ))
            .await
            .expect("Failed to create user");

        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&Course::new(
                user.id,
                1,
                "Rust 101".to_string(),
                "rust-101".to_string(),
                String::new(),
            ))
            .await
            .expect("Failed to create course");

        let module_repo = SqlxModuleRepository::new(pool.clone());
        let modules = module_repo
            .apply_changes(
                course.id,
                ModuleChanges {
                    creates: vec![("Getting Started".to_string(), String::new())],
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to create module");

        (pool.clone(), SqlxContentRepository::new(pool), modules[0].id)
    }

    #[tokio::test]
    async fn test_create_appends_at_tail() {
        let (_pool, repo, module_id) = setup().await;

        let first = repo
            .create_item(module_id, ContentKind::Text, 1, "Welcome", "Hello")
            .await
            .expect("Create failed");
        let second = repo
            .create_item(module_id, ContentKind::Video, 1, "Lecture", "https://v.example/1")
            .await
            .expect("Create failed");

        assert_eq!(first.content.sort_order, 0);
        assert_eq!(second.content.sort_order, 1);
        assert_eq!(second.item.kind(), ContentKind::Video);
        assert_eq!(second.item.payload(), "https://v.example/1");
    }

    #[tokio::test]
    async fn test_list_resolves_mixed_kinds_in_order() {
        let (_pool, repo, module_id) = setup().await;

        repo.create_item(module_id, ContentKind::Image, 1, "Diagram", "img/d.png")
            .await
            .expect("Create failed");
        repo.create_item(module_id, ContentKind::Text, 1, "Notes", "Body")
            .await
            .expect("Create failed");
        repo.create_item(module_id, ContentKind::File, 1, "Slides", "files/s.pdf")
            .await
            .expect("Create failed");

        let contents = repo.list_by_module(module_id).await.expect("List failed");
        assert_eq!(contents.len(), 3);
        let kinds: Vec<ContentKind> = contents.iter().map(|c| c.item.kind()).collect();
        assert_eq!(
            kinds,
            [ContentKind::Image, ContentKind::Text, ContentKind::File]
        );
        let orders: Vec<i64> = contents.iter().map(|c| c.content.sort_order).collect();
        assert_eq!(orders, [0, 1, 2]);
    }

    #[tokio::test]
    async fn test_item_ids_are_per_kind() {
        let (_pool, repo, module_id) = setup().await;

        // Each kind's table numbers independently, so both items get ID 1
        let text = repo
            .create_item(module_id, ContentKind::Text, 1, "T", "b")
            .await
            .expect("Create failed");
        let video = repo
            .create_item(module_id, ContentKind::Video, 1, "V", "u")
            .await
            .expect("Create failed");

        assert_eq!(text.item.id(), 1);
        assert_eq!(video.item.id(), 1);
        assert_ne!(text.content.id, video.content.id);
    }

    #[tokio::test]
    async fn test_update_item() {
        let (_pool, repo, module_id) = setup().await;
        let created = repo
            .create_item(module_id, ContentKind::Text, 1, "Draft", "v1")
            .await
            .expect("Create failed");

        let updated = repo
            .update_item(ContentKind::Text, created.item.id(), "Final", "v2")
            .await
            .expect("Update failed")
            .expect("Item should exist");

        assert_eq!(updated.title(), "Final");
        assert_eq!(updated.payload(), "v2");
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let (_pool, repo, _module_id) = setup().await;
        let result = repo
            .update_item(ContentKind::Video, 999, "T", "u")
            .await
            .expect("Update failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_item_and_renumbers() {
        let (pool, repo, module_id) = setup().await;

        let first = repo
            .create_item(module_id, ContentKind::Text, 1, "A", "a")
            .await
            .expect("Create failed");
        repo.create_item(module_id, ContentKind::Text, 1, "B", "b")
            .await
            .expect("Create failed");
        repo.create_item(module_id, ContentKind::Text, 1, "C", "c")
            .await
            .expect("Create failed");

        let deleted = repo.delete(first.content.id).await.expect("Delete failed");
        assert!(deleted);

        // Item row is gone
        let row = sqlx::query("SELECT COUNT(*) as count FROM text_items")
            .fetch_one(&pool)
            .await
            .expect("Count failed");
        let count: i64 = row.get("count");
        assert_eq!(count, 2);

        // Survivors closed the gap
        let contents = repo.list_by_module(module_id).await.expect("List failed");
        let titles: Vec<&str> = contents.iter().map(|c| c.item.title()).collect();
        assert_eq!(titles, ["B", "C"]);
        let orders: Vec<i64> = contents.iter().map(|c| c.content.sort_order).collect();
        assert_eq!(orders, [0, 1]);
    }

    #[tokio::test]
    async fn test_delete_missing_content() {
        let (_pool, repo, _module_id) = setup().await;
        let deleted = repo.delete(999).await.expect("Delete failed");
        assert!(!deleted);
    }
}
