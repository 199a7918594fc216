//! An abstraction layer for the chat models behind the agents.
//!
//! This crate establishes an unified protocol for agents to talk with
//! the supported model providers, so that an agent can be backed by any
//! of them (or by a scripted fake in tests) without modifying the agent
//! code.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
