use async_trait::async_trait;
use chrono::Utc;
use common::{BlogDelta, CommentStore, Link};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{blog, comment};

/// `CommentStore` backed by the relational database.
///
/// Bind it to a transaction to make a whole propagation all-or-nothing.
pub struct SeaCommentStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SeaCommentStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C: ConnectionTrait> CommentStore for SeaCommentStore<'_, C> {
    type Error = DbErr;

    async fn add_to_replies(&self, id: i32, delta: i32) -> Result<Link, DbErr> {
        let result = comment::Entity::update_many()
            .col_expr(
                comment::Column::TotalReplies,
                Expr::col(comment::Column::TotalReplies).add(delta),
            )
            .filter(comment::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(Link::Missing);
        }

        let parent: Option<Option<i32>> = comment::Entity::find_by_id(id)
            .select_only()
            .column(comment::Column::ParentId)
            .into_tuple()
            .one(self.conn)
            .await?;

        Ok(match parent {
            Some(Some(parent_id)) => Link::Parent(parent_id),
            Some(None) => Link::Root,
            None => Link::Missing,
        })
    }

    async fn apply_blog_delta(&self, blog_id: i32, delta: BlogDelta) -> Result<(), DbErr> {
        if delta.is_zero() {
            return Ok(());
        }

        blog::Entity::update_many()
            .col_expr(
                blog::Column::TotalComments,
                Expr::col(blog::Column::TotalComments).add(delta.total_comments),
            )
            .col_expr(
                blog::Column::TotalParentComments,
                Expr::col(blog::Column::TotalParentComments).add(delta.total_parent_comments),
            )
            .filter(blog::Column::Id.eq(blog_id))
            .exec(self.conn)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, id: i32) -> Result<bool, DbErr> {
        let result = comment::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn child_ids(&self, id: i32) -> Result<Vec<i32>, DbErr> {
        comment::Entity::find()
            .filter(comment::Column::ParentId.eq(id))
            .select_only()
            .column(comment::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
    }

    async fn set_content(&self, id: i32, content: &str) -> Result<bool, DbErr> {
        let result = comment::Entity::update_many()
            .col_expr(comment::Column::Content, Expr::value(content.to_owned()))
            .col_expr(comment::Column::IsEdited, Expr::value(true))
            .col_expr(comment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(comment::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

/// Atomically add `delta` to one of a blog's activity counters.
pub async fn add_to_blog_counter<C: ConnectionTrait>(
    conn: &C,
    blog_id: i32,
    column: blog::Column,
    delta: i32,
) -> Result<(), DbErr> {
    blog::Entity::update_many()
        .col_expr(column, Expr::col(column).add(delta))
        .filter(blog::Column::Id.eq(blog_id))
        .exec(conn)
        .await?;
    Ok(())
}
