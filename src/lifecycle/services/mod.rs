//! Orchestration services for task status propagation.

mod activation;
mod aggregation;
mod completion;
mod dispatch;
mod error;
mod lifecycle;
mod propagation;
mod reset;
mod stepback;

pub use completion::MarkEndRequest;
pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::TaskLifecycleService;
pub use reset::ResetTaskRequest;
