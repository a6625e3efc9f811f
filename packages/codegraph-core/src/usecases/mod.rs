//! Orchestration layer: composes the feature modules into the operations
//! an external caller (CLI, server) actually invokes.

pub mod index_project;

pub use index_project::{IndexProject, IndexSummary};
