pub mod comments;

pub use comments::{
    BlogDelta, CommentNode, CommentStore, CounterPropagator, DeletePolicy, Deletion, Link,
};
