use serde::Serialize;
use utoipa::ToSchema;

/// Like state of a blog for the acting user.
#[derive(Serialize, ToSchema)]
pub struct LikeResponse {
    pub blog_id: i32,
    /// Whether the acting user likes the blog.
    pub liked: bool,
    pub total_likes: i32,
}
