use common::CommentNode;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub blog_id: i32,
    #[sea_orm(belongs_to, from = "blog_id", to = "id")]
    pub blog: HasOne<super::blog::Entity>,

    /// Copied from the blog so delete permission needs no join.
    pub blog_author_id: i32,
    pub commented_by: i32,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub is_reply: bool,
    /// Immediate parent. Deliberately not a foreign key: replies of a deleted
    /// comment keep pointing at its id.
    pub parent_id: Option<i32>,
    /// All descendants, not just direct children.
    pub total_replies: i32,
    pub is_edited: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn node(&self) -> CommentNode {
        CommentNode {
            id: self.id,
            blog_id: self.blog_id,
            parent_id: self.parent_id,
            total_replies: self.total_replies,
        }
    }
}
