// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Accounts
//!
//! - [`types`]: `Account` and the closed `AccountType` enum.
//! - [`rules`]: the total source/destination compatibility table.
//! - [`cache`]: read-through LRU cache over the history store.

pub mod cache;
pub mod rules;
pub mod types;

pub use cache::{AccountCache, CacheStats};
pub use rules::{is_allowed, is_allowed_codes};
pub use types::{Account, AccountType};
