//! Task lifecycle and status propagation.
//!
//! A task moves through dispatch, start, and finish. Each transition is
//! persisted on the task first and then propagated outward: the cached task
//! summary on the parent build, the build status recomputed from all of its
//! tasks, and finally the version and patch once every build has finished.
//! Failures can trigger stepback, which activates the previous execution of
//! the same task so a regression can be bisected.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
