use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument, warn};

use super::node::{BlogDelta, CommentNode};
use super::traits::{CommentStore, Link};

/// What happens to the descendants of a deleted comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Descendants stay in storage with a dangling parent reference.
    #[default]
    Orphan,
    /// Descendants are deleted together with the comment.
    Cascade,
}

/// Result of recording a comment deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    /// Delta applied to every ancestor's `total_replies`.
    pub decrement: i32,
    /// Delta applied to the blog's activity counters.
    pub blog: BlogDelta,
    /// Number of ancestors whose counter was updated.
    pub ancestors_updated: usize,
    /// Comment records removed from storage, the deleted comment first.
    /// Empty if the comment was already gone.
    pub removed: Vec<i32>,
}

/// Keeps `total_replies` and the blog activity counters in step with the
/// shape of the comment tree.
///
/// Each step is a separate store call. Callers that need all-or-nothing
/// behavior hand in a store bound to a transaction.
pub struct CounterPropagator<'s, S: ?Sized> {
    store: &'s S,
    policy: DeletePolicy,
}

impl<'s, S: CommentStore + ?Sized> CounterPropagator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            policy: DeletePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DeletePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Account for a new top-level comment on `blog_id`.
    #[instrument(skip(self))]
    pub async fn record_comment(&self, blog_id: i32) -> Result<(), S::Error> {
        self.store
            .apply_blog_delta(blog_id, BlogDelta::NEW_COMMENT)
            .await
    }

    /// Account for a new reply to `parent_id`.
    ///
    /// The parent and every ancestor above it gain one reply. Returns the
    /// number of comments whose counter was incremented.
    #[instrument(skip(self))]
    pub async fn record_reply(&self, blog_id: i32, parent_id: i32) -> Result<usize, S::Error> {
        let updated = self.propagate(parent_id, 1).await?;
        self.store
            .apply_blog_delta(blog_id, BlogDelta::NEW_REPLY)
            .await?;

        debug!(updated, "Reply recorded");
        Ok(updated)
    }

    /// Delete `comment` and remove it, with its whole subtree, from the counters.
    ///
    /// `comment` must be the record as read before this call; its
    /// `total_replies` decides the size of the decrement.
    #[instrument(skip(self, comment), fields(comment_id = comment.id, blog_id = comment.blog_id))]
    pub async fn record_deletion(&self, comment: CommentNode) -> Result<Deletion, S::Error> {
        let decrement = comment.deletion_delta();

        let removed = match self.policy {
            DeletePolicy::Orphan => {
                if self.store.delete_comment(comment.id).await? {
                    vec![comment.id]
                } else {
                    Vec::new()
                }
            }
            DeletePolicy::Cascade => self.remove_subtree(comment.id).await?,
        };

        // Someone else deleted it first and already adjusted the counters.
        if removed.is_empty() {
            debug!("Comment already deleted, counters left unchanged");
            return Ok(Deletion {
                decrement: 0,
                blog: BlogDelta::default(),
                ancestors_updated: 0,
                removed,
            });
        }

        let ancestors_updated = match comment.parent_id {
            Some(parent_id) => self.propagate(parent_id, decrement).await?,
            None => 0,
        };

        let blog = BlogDelta::deletion(&comment);
        self.store.apply_blog_delta(comment.blog_id, blog).await?;

        debug!(decrement, ancestors_updated, removed = removed.len(), "Deletion recorded");
        Ok(Deletion {
            decrement,
            blog,
            ancestors_updated,
            removed,
        })
    }

    /// Replace a comment's content. Counters are not touched.
    #[instrument(skip(self, content))]
    pub async fn record_edit(&self, id: i32, content: &str) -> Result<bool, S::Error> {
        self.store.set_content(id, content).await
    }

    /// Apply `delta` to `start` and every ancestor above it.
    async fn propagate(&self, start: i32, delta: i32) -> Result<usize, S::Error> {
        let mut visited = HashSet::new();
        let mut next = Some(start);

        while let Some(id) = next {
            if !visited.insert(id) {
                warn!(comment_id = id, "Parent links form a cycle, stopping propagation");
                break;
            }

            next = match self.store.add_to_replies(id, delta).await? {
                Link::Parent(parent_id) => Some(parent_id),
                Link::Root => None,
                Link::Missing => {
                    visited.remove(&id);
                    debug!(comment_id = id, "Ancestor not found, stopping propagation");
                    None
                }
            };
        }

        Ok(visited.len())
    }

    /// Delete `root` and then all of its descendants, breadth first.
    async fn remove_subtree(&self, root: i32) -> Result<Vec<i32>, S::Error> {
        if !self.store.delete_comment(root).await? {
            return Ok(Vec::new());
        }

        let mut removed = vec![root];
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            for child in self.store.child_ids(id).await? {
                if self.store.delete_comment(child).await? {
                    removed.push(child);
                    queue.push_back(child);
                }
            }
        }

        Ok(removed)
    }
}
