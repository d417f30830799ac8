pub mod blog;
pub mod comment;
pub mod like;
