use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::blog;
use crate::error::AppError;

use super::shared::{validate_text, validate_title};

/// Request body for publishing a blog.
#[derive(Deserialize, ToSchema)]
pub struct CreateBlogRequest {
    /// Blog title (1-256 characters).
    #[schema(example = "Notes on nested comments")]
    pub title: String,
    /// Short description shown in listings (1-500 characters).
    #[schema(example = "How reply counters stay honest")]
    pub description: String,
    /// Markdown body.
    pub content: String,
}

pub fn validate_create_blog(payload: &CreateBlogRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_text("Description", &payload.description, 500)?;
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    Ok(())
}

/// Aggregate counters of a blog.
#[derive(Serialize, ToSchema)]
pub struct BlogActivity {
    pub total_likes: i32,
    /// Comments and replies.
    pub total_comments: i32,
    /// Top-level comments only.
    pub total_parent_comments: i32,
    pub total_reads: i32,
}

impl From<&blog::Model> for BlogActivity {
    fn from(m: &blog::Model) -> Self {
        Self {
            total_likes: m.total_likes,
            total_comments: m.total_comments,
            total_parent_comments: m.total_parent_comments,
            total_reads: m.total_reads,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BlogResponse {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub description: String,
    pub content: String,
    pub activity: BlogActivity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<blog::Model> for BlogResponse {
    fn from(m: blog::Model) -> Self {
        Self {
            activity: BlogActivity::from(&m),
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            description: m.description,
            content: m.content,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// The blog fields returned alongside comment writes.
#[derive(Serialize, ToSchema)]
pub struct BlogSummary {
    pub id: i32,
    pub author_id: i32,
    pub activity: BlogActivity,
}

impl From<blog::Model> for BlogSummary {
    fn from(m: blog::Model) -> Self {
        Self {
            activity: BlogActivity::from(&m),
            id: m.id,
            author_id: m.author_id,
        }
    }
}
