//! Role compatibility for payment-shaped operations.
//!
//! For every `Payment` and `PathPayment`, both ends are looked up through
//! the account cache and checked against [`crate::account::rules`].
//! `CreateAccount` is skipped: its destination does not exist yet.
//! Payments to an account created earlier in the same envelope are skipped
//! too, since its type is only known once history ingests it.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{ValidationError, Validator};
use crate::account::{is_allowed_codes, Account, AccountCache};
use crate::envelope::{EnvelopeInfo, OperationBody};
use crate::store::StoreError;

pub struct AccountTypeValidator {
    accounts: Arc<AccountCache>,
}

impl AccountTypeValidator {
    pub fn new(accounts: Arc<AccountCache>) -> Self {
        Self { accounts }
    }

    async fn lookup(&self, address: &str) -> Result<Account, ValidationError> {
        self.accounts.get(address).await.map_err(|e| match e {
            StoreError::NotFound => ValidationError::UnknownAccount {
                address: address.to_string(),
            },
            other => ValidationError::Store(other),
        })
    }
}

#[async_trait]
impl Validator for AccountTypeValidator {
    fn name(&self) -> &'static str {
        "account_type"
    }

    async fn validate(&self, info: &EnvelopeInfo) -> Result<(), ValidationError> {
        let tx_source = info.source_address.as_str();
        let mut created: HashSet<&str> = HashSet::new();

        for op in info.operations() {
            if let OperationBody::CreateAccount { destination, .. } = &op.body {
                created.insert(destination.as_str());
                continue;
            }
            let Some(destination) = op.body.payment_destination() else {
                continue;
            };
            if created.contains(destination) {
                debug!(destination, "payment to account created in this envelope");
                continue;
            }
            let source = self.lookup(op.effective_source(tx_source)).await?;
            let dest = self.lookup(destination).await?;

            if !is_allowed_codes(source.account_type, dest.account_type) {
                return Err(ValidationError::AccountTypeMismatch {
                    source_account: source.address,
                    destination_account: dest.address,
                    source_type: source.account_type,
                    destination_type: dest.account_type,
                });
            }
        }
        Ok(())
    }
}
