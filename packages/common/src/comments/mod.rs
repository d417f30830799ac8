mod node;
mod propagator;
mod traits;


pub use node::{BlogDelta, CommentNode};
pub use propagator::{CounterPropagator, DeletePolicy, Deletion};
pub use traits::{CommentStore, Link};
