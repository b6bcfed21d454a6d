//! File processor adapters.

mod local;
mod memory;
pub mod transform;

pub use local::{DOT, DRY_RUN, LocalFileProcessor};
pub use memory::MemoryFileProcessor;
pub use transform::{Transform, TransformRegistry};
