use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::comment;

pub use super::blog::BlogSummary;
pub use super::shared::{PageQuery, Pagination};

/// Request body for a new comment or reply.
#[derive(Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text, trimmed before storage.
    #[schema(example = "Great write-up!")]
    pub content: String,
}

/// Request body for editing a comment.
#[derive(Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    /// Replacement text, trimmed before storage.
    #[schema(example = "Great write-up! (edited)")]
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub blog_id: i32,
    pub blog_author_id: i32,
    pub commented_by: i32,
    pub content: String,
    pub is_reply: bool,
    /// Immediate parent; may reference a deleted comment.
    pub parent_id: Option<i32>,
    /// Number of descendants, direct and indirect.
    pub total_replies: i32,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            blog_id: m.blog_id,
            blog_author_id: m.blog_author_id,
            commented_by: m.commented_by,
            content: m.content,
            is_reply: m.is_reply,
            parent_id: m.parent_id,
            total_replies: m.total_replies,
            is_edited: m.is_edited,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A created comment or reply with the blog counters after the write.
#[derive(Serialize, ToSchema)]
pub struct CommentWriteResponse {
    pub comment: CommentResponse,
    pub blog: BlogSummary,
}

#[derive(Serialize, ToSchema)]
pub struct CommentListResponse {
    pub data: Vec<CommentResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteCommentResponse {
    /// ID of the deleted comment.
    pub id: i32,
    /// Amount removed from every ancestor's `total_replies` and from the
    /// blog's `total_comments`.
    #[schema(example = -3)]
    pub decrement: i32,
    /// Comment records removed from storage. Contains only `id` unless
    /// cascading deletion is enabled.
    pub removed: Vec<i32>,
    pub blog: BlogSummary,
}
