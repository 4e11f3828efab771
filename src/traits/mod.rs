pub mod block;
pub mod engine;

pub use block::{Block, Flow, SuspendOn};
pub use engine::Engine;
