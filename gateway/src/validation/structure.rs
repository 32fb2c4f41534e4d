//! Stateless shape checks. No store access, so this runs first.

use async_trait::async_trait;

use super::{ValidationError, Validator};
use crate::config::ValidationConfig;
use crate::crypto::is_valid_address;
use crate::envelope::EnvelopeInfo;

pub struct StructureValidator {
    config: ValidationConfig,
}

impl StructureValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Validator for StructureValidator {
    fn name(&self) -> &'static str {
        "structure"
    }

    async fn validate(&self, info: &EnvelopeInfo) -> Result<(), ValidationError> {
        let tx = &info.envelope.tx;
        let count = tx.operations.len();

        if count == 0 {
            return Err(ValidationError::NoOperations);
        }
        if count > self.config.max_operations {
            return Err(ValidationError::TooManyOperations {
                count,
                max: self.config.max_operations,
            });
        }

        let required = self.config.base_fee.saturating_mul(count as u64);
        if tx.fee < required {
            return Err(ValidationError::FeeTooLow {
                fee: tx.fee,
                required,
            });
        }

        if tx.seq_num == 0 {
            return Err(ValidationError::InvalidSequence);
        }

        let op_addresses = tx.operations.iter().flat_map(|op| {
            op.source_account
                .as_deref()
                .into_iter()
                .chain(op.body.referenced_addresses())
        });
        for address in std::iter::once(tx.source_account.as_str()).chain(op_addresses) {
            if !is_valid_address(address) {
                return Err(ValidationError::InvalidAddress {
                    address: address.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TEST_NETWORK_PASSPHRASE;
    use crate::envelope::{decode, encode, Asset, EnvelopeBuilder, OperationBody};
    use crate::fixtures;

    fn validator() -> StructureValidator {
        StructureValidator::new(ValidationConfig {
            max_operations: 2,
            base_fee: 100,
            min_signature_weight: 1,
        })
    }

    fn pay(to: String) -> OperationBody {
        OperationBody::Payment {
            destination: to,
            asset: Asset::Native,
            amount: 1,
        }
    }

    fn info(builder: EnvelopeBuilder) -> EnvelopeInfo {
        decode(&encode(&builder.build()).unwrap(), TEST_NETWORK_PASSPHRASE).unwrap()
    }

    #[tokio::test]
    async fn well_formed_envelope_passes() {
        let src = fixtures::keypair(1).address();
        let dst = fixtures::keypair(2).address();
        let env = info(EnvelopeBuilder::new(src).sequence(1).operation(pay(dst)));
        assert!(validator().validate(&env).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_empty_transaction() {
        let src = fixtures::keypair(1).address();
        let env = info(EnvelopeBuilder::new(src).sequence(1).fee(100));
        assert_eq!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::NoOperations
        );
    }

    #[tokio::test]
    async fn rejects_too_many_operations() {
        let src = fixtures::keypair(1).address();
        let dst = fixtures::keypair(2).address();
        let env = info(
            EnvelopeBuilder::new(src)
                .sequence(1)
                .operation(pay(dst.clone()))
                .operation(pay(dst.clone()))
                .operation(pay(dst)),
        );
        assert_eq!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::TooManyOperations { count: 3, max: 2 }
        );
    }

    #[tokio::test]
    async fn rejects_fee_below_floor() {
        let src = fixtures::keypair(1).address();
        let dst = fixtures::keypair(2).address();
        let env = info(
            EnvelopeBuilder::new(src)
                .sequence(1)
                .fee(150)
                .operation(pay(dst.clone()))
                .operation(pay(dst)),
        );
        assert_eq!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::FeeTooLow {
                fee: 150,
                required: 200
            }
        );
    }

    #[tokio::test]
    async fn rejects_zero_sequence() {
        let src = fixtures::keypair(1).address();
        let dst = fixtures::keypair(2).address();
        let env = info(EnvelopeBuilder::new(src).operation(pay(dst)));
        assert_eq!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::InvalidSequence
        );
    }

    #[tokio::test]
    async fn rejects_bad_destination_and_override() {
        let src = fixtures::keypair(1).address();
        let env = info(
            EnvelopeBuilder::new(src.clone())
                .sequence(1)
                .operation(pay("not-hex".into())),
        );
        assert_eq!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::InvalidAddress {
                address: "not-hex".into()
            }
        );

        let dst = fixtures::keypair(2).address();
        let env = info(
            EnvelopeBuilder::new(src)
                .sequence(1)
                .operation_from(dst.to_uppercase(), pay(dst.clone())),
        );
        assert!(matches!(
            validator().validate(&env).await.unwrap_err(),
            ValidationError::InvalidAddress { .. }
        ));
    }
}
