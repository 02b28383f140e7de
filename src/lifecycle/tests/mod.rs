//! Unit tests for the lifecycle engine.
