//! An HTTP service that runs question-answering agents backed by hosted
//! language models.
//!
//! Two agents are offered, see [`agents::AgentType`]. Each request builds
//! a fresh agent for the requested model, runs it once, and returns the
//! answer either as a whole or as a stream of text fragments.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod agents;
pub mod api;
pub mod settings;
