// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Harbor Gateway — Core Library
//!
//! Harbor sits between untrusted submitters and a ledger core node. It
//! decodes signed transaction envelopes, refuses the ones that break
//! business rules before they cost the network anything, forwards the rest,
//! and reports what happened to them, even while the history store is
//! still catching up with the ledger.
//!
//! ## Architecture
//!
//! Leaf modules first:
//!
//! - **config** — Constants, network passphrases, runtime knobs.
//! - **crypto** — SHA-256 and ed25519. Don't roll your own.
//! - **envelope** — Wire types, base64/bincode codec, the content hash.
//! - **store** — Core/history store contracts and their backends.
//! - **account** — Account roles, the compatibility table, the LRU cache.
//! - **validation** — The validator chain.
//! - **network** — The ledger node seam, plus an in-process dev ledger.
//! - **resolver** — Two-store result reconciliation.
//! - **submission** — Decode → validate → submit → poll, under a deadline.
//!
//! ## Design Philosophy
//!
//! 1. The content hash is the primary key for everything after decode.
//!    Get it wrong and results go missing, so it has tests. Plural.
//! 2. "Not found yet" is an answer, not an error.
//! 3. Nothing blocks forever: every await after decode runs under a
//!    caller-supplied deadline.

pub mod account;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod network;
pub mod resolver;
pub mod result;
pub mod store;
pub mod submission;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use resolver::{Resolution, ResultResolver};
pub use result::{ResultSource, SubmissionResult};
pub use submission::SubmissionCoordinator;
