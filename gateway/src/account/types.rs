// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Account records as the history store reports them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of roles an account can play.
///
/// Discriminants are the integer codes stored in the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i32)]
pub enum AccountType {
    AnonymousUser = 0,
    RegisteredUser = 1,
    Merchant = 2,
    DistributionAgent = 3,
    SettlementAgent = 4,
    ExchangeAgent = 5,
    Bank = 6,
    ScratchCard = 7,
}

impl AccountType {
    /// Every role, in code order.
    pub const ALL: [AccountType; 8] = [
        Self::AnonymousUser,
        Self::RegisteredUser,
        Self::Merchant,
        Self::DistributionAgent,
        Self::SettlementAgent,
        Self::ExchangeAgent,
        Self::Bank,
        Self::ScratchCard,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnonymousUser => "anonymous_user",
            Self::RegisteredUser => "registered_user",
            Self::Merchant => "merchant",
            Self::DistributionAgent => "distribution_agent",
            Self::SettlementAgent => "settlement_agent",
            Self::ExchangeAgent => "exchange_agent",
            Self::Bank => "bank",
            Self::ScratchCard => "scratch_card",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account snapshot.
///
/// `account_type` is the raw stored code rather than [`AccountType`]: the
/// store may hold codes this build does not know, and those must reach the
/// policy table (which denies them) instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub address: String,
    pub account_type: i32,
}

impl Account {
    pub fn new(id: u64, address: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id,
            address: address.into(),
            account_type: account_type.code(),
        }
    }

    /// The decoded role, or `None` for an unrecognised code.
    pub fn kind(&self) -> Option<AccountType> {
        AccountType::from_code(self.account_type)
    }
}
