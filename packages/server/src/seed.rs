use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::comment;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Top-level comments of a blog, newest first:
    // SELECT ... FROM comment WHERE blog_id = ? AND parent_id IS NULL ORDER BY created_at
    let by_blog = Index::create()
        .if_not_exists()
        .name("idx_comment_blog_parent_created")
        .table(comment::Entity)
        .col(comment::Column::BlogId)
        .col(comment::Column::ParentId)
        .col(comment::Column::CreatedAt)
        .to_owned();
    create_index(db, "idx_comment_blog_parent_created", &by_blog).await;

    // Direct replies and the cascade walk:
    // SELECT ... FROM comment WHERE parent_id = ?
    let by_parent = Index::create()
        .if_not_exists()
        .name("idx_comment_parent_created")
        .table(comment::Entity)
        .col(comment::Column::ParentId)
        .col(comment::Column::CreatedAt)
        .to_owned();
    create_index(db, "idx_comment_parent_created", &by_parent).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = db.get_database_backend().build(stmt).to_string();

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}
