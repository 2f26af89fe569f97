//! Advisory content generation pipeline.
//!
//! A request flows prompt composition → completion → normalization, or
//! → fallback when the completion service fails. The per-kind differences
//! live in one table ([`agents`]); [`orchestrator`] is the single entry point.
//! [`service`] wires the pipeline to the persistence collaborators.

pub mod agents;
pub mod fallback;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::GenerationOrchestrator;
pub use service::{AdvisoryService, FailurePolicy};
