use async_trait::async_trait;

use super::node::BlogDelta;

/// What a counter update found at its target comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// The comment was updated and is a reply to this comment.
    Parent(i32),
    /// The comment was updated and has no parent.
    Root,
    /// No comment with this id exists.
    Missing,
}

/// Comment and blog storage as seen by the counter protocol.
///
/// Every method is a single store operation. Implementations must apply
/// counter deltas atomically (`col = col + delta`), never as a read followed
/// by a write of the full value.
#[async_trait]
pub trait CommentStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add `delta` to the comment's `total_replies` and report its parent.
    async fn add_to_replies(&self, id: i32, delta: i32) -> Result<Link, Self::Error>;

    /// Add `delta` to the blog's `total_comments` / `total_parent_comments`.
    async fn apply_blog_delta(&self, blog_id: i32, delta: BlogDelta) -> Result<(), Self::Error>;

    /// Delete a single comment record.
    ///
    /// Returns `true` if the comment was deleted, `false` if it did not exist.
    async fn delete_comment(&self, id: i32) -> Result<bool, Self::Error>;

    /// Ids of comments whose parent is `id`.
    async fn child_ids(&self, id: i32) -> Result<Vec<i32>, Self::Error>;

    /// Overwrite a comment's content and mark it edited.
    ///
    /// Returns `false` if the comment does not exist.
    async fn set_content(&self, id: i32, content: &str) -> Result<bool, Self::Error>;
}
