pub mod queue;
pub mod shortener;

pub use queue::{Action, QueueWorker, Task};
pub use shortener::Shortener;
