// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Account-Type Compatibility
//!
//! Which role may pay which. The table is total over [`AccountType`]:
//! every (source, destination) pair has an entry, and codes outside the
//! enum are denied.
//!
//! ```text
//!                   dst: anon reg  merch dist settl exch bank card
//! anonymous_user          Y    Y    Y     .    .     Y    .    .
//! registered_user         Y    Y    Y     Y    .     Y    .    .
//! merchant                .    Y    Y     .    Y     Y    .    .
//! distribution_agent      Y    Y    Y     Y    Y     .    .    Y
//! settlement_agent        .    .    Y     Y    Y     .    Y    .
//! exchange_agent          Y    Y    .     .    Y     Y    Y    .
//! bank                    .    Y    .     Y    Y     Y    Y    .
//! scratch_card            Y    Y    .     .    .     .    .    .
//! ```
//!
//! Banks never pay anonymous users directly; funds reach them through an
//! agent. Scratch cards are only issued by distribution agents and only
//! redeemed into user wallets.

use super::types::AccountType;

const Y: bool = true;
const N: bool = false;

/// `POLICY[source][destination]`, indexed by type code.
pub const POLICY: [[bool; 8]; 8] = [
    // anon reg merch dist settl exch bank card
    [Y, Y, Y, N, N, Y, N, N], // anonymous_user
    [Y, Y, Y, Y, N, Y, N, N], // registered_user
    [N, Y, Y, N, Y, Y, N, N], // merchant
    [Y, Y, Y, Y, Y, N, N, Y], // distribution_agent
    [N, N, Y, Y, Y, N, Y, N], // settlement_agent
    [Y, Y, N, N, Y, Y, Y, N], // exchange_agent
    [N, Y, N, Y, Y, Y, Y, N], // bank
    [Y, Y, N, N, N, N, N, N], // scratch_card
];

/// Whether `source` may pay `destination`.
pub fn is_allowed(source: AccountType, destination: AccountType) -> bool {
    POLICY[source as usize][destination as usize]
}

/// Same as [`is_allowed`] on raw stored codes. Unknown codes fail closed.
pub fn is_allowed_codes(source: i32, destination: i32) -> bool {
    match (AccountType::from_code(source), AccountType::from_code(destination)) {
        (Some(s), Some(d)) => is_allowed(s, d),
        _ => false,
    }
}
