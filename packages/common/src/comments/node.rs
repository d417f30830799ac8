/// The slice of a comment record that the counter protocol reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentNode {
    pub id: i32,
    pub blog_id: i32,
    /// Immediate parent. `None` for top-level comments.
    pub parent_id: Option<i32>,
    /// Number of descendants, direct and indirect.
    pub total_replies: i32,
}

impl CommentNode {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Signed delta applied to every ancestor and to the blog total when this
    /// comment and its whole subtree leave the counters.
    pub fn deletion_delta(&self) -> i32 {
        -(1 + self.total_replies)
    }
}

/// Increments applied to a blog's activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlogDelta {
    pub total_comments: i32,
    pub total_parent_comments: i32,
}

impl BlogDelta {
    pub const NEW_COMMENT: BlogDelta = BlogDelta {
        total_comments: 1,
        total_parent_comments: 1,
    };

    pub const NEW_REPLY: BlogDelta = BlogDelta {
        total_comments: 1,
        total_parent_comments: 0,
    };

    /// Delta for removing `node` and everything below it.
    pub fn deletion(node: &CommentNode) -> Self {
        Self {
            total_comments: node.deletion_delta(),
            total_parent_comments: if node.is_reply() { 0 } else { -1 },
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
