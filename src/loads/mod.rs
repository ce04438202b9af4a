//! Load types

mod distributed;
mod node_load;

pub use distributed::{DistributedLoad, Intensity};
pub use node_load::NodeLoad;
