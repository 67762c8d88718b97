//! A provider-neutral protocol for chat and embedding models.
//!
//! The assistant talks to its language model through the types in this
//! crate, so the orchestration loop never depends on a concrete vendor API.
//! A provider turns a [`ModelRequest`] into a stream of
//! [`ModelResponseEvent`]s, and an embedding provider turns texts into
//! vectors for retrieval.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod embedding;
mod error;
mod provider;
mod request;
mod response;

pub use embedding::*;
pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
