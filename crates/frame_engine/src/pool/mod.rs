//! Object pools for short-lived scheduler objects
//!
//! Screenshots, pickers and node lists are requested often and live for a
//! single frame, so they are recycled instead of allocated per request.

pub mod object_pool;
pub mod byte_buffer_pool;
pub mod node_list;
pub mod sched_ops_pool;

pub use object_pool::{ObjectPool, Poolable, DEFAULT_LEAK_THRESHOLD};
pub use byte_buffer_pool::ByteBufferPool;
pub use node_list::NodeList;
pub use sched_ops_pool::SchedOpsPool;
