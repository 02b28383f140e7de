//! Stepback: task status propagation for a continuous-integration pipeline.
//!
//! Work is organized as versions (one pipeline invocation), builds (one
//! build variant within a version), and tasks (units of work within a
//! build). This crate owns the rules by which a task's status changes and
//! how those changes roll up into its build, version, and patch, including
//! stepback on failure and the execution cap on resets.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure state and roll-up rules with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for the status store and the
//!   audit event recorder
//! - **Adapters**: In-memory store and event log, and a `tracing` recorder
//!
//! # Modules
//!
//! - [`lifecycle`]: Task transitions and status propagation

pub mod lifecycle;
