//! The runnable agent: system instructions on top of a model provider.
//!
//! An [`Agent`] is cheap to build and is meant to serve a single run. It
//! can either wait for the whole answer ([`Agent::run`]) or relay the
//! answer as it is being generated ([`Agent::run_stream`]).

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod error;
mod model_client;

pub use agent::{Agent, AgentBuilder, RunResponse, RunStream};
pub use error::RunError;
