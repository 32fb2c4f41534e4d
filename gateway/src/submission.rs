// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Submission Coordinator
//!
//! Turns one raw envelope into one [`SubmissionResult`]:
//!
//! ```text
//! 1. DECODE    — base64 → typed envelope + content hash
//! 2. VALIDATE  — validator chain; any failure stops here
//! 3. CHECK     — already applied? return the recorded result
//! 4. SUBMIT    — hand the envelope to the ledger node
//! 5. POLL      — resolver with backoff until resolved, attempts run out,
//!                or the deadline passes
//! ```
//!
//! Every await from step 2 on runs under the same deadline. Dropping the
//! returned future cancels the submission wherever it is, sleeps
//! included. Once step 4 has happened, a missed deadline yields
//! [`GatewayError::Timeout`] with `submitted = true`: the transaction may
//! still apply and the hash stays valid for [`Self::result_by_hash`].

use std::sync::Arc;

use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::account::AccountCache;
use crate::config::{network_name, GatewayConfig};
use crate::envelope::{decode, EnvelopeInfo};
use crate::error::GatewayError;
use crate::network::{LedgerNetwork, SubmitStatus};
use crate::resolver::ResultResolver;
use crate::result::SubmissionResult;
use crate::store::{CoreStore, HistoryStore};
use crate::validation::ValidatorChain;

pub struct SubmissionCoordinator {
    config: GatewayConfig,
    network: Arc<dyn LedgerNetwork>,
    validators: ValidatorChain,
    resolver: ResultResolver,
    accounts: Arc<AccountCache>,
}

impl SubmissionCoordinator {
    pub fn new(
        config: GatewayConfig,
        network: Arc<dyn LedgerNetwork>,
        validators: ValidatorChain,
        resolver: ResultResolver,
        accounts: Arc<AccountCache>,
    ) -> Self {
        Self {
            config,
            network,
            validators,
            resolver,
            accounts,
        }
    }

    /// Wires the standard validator chain, account cache and resolver
    /// over the given stores.
    pub fn assemble(
        config: GatewayConfig,
        core: Arc<dyn CoreStore>,
        history: Arc<dyn HistoryStore>,
        network: Arc<dyn LedgerNetwork>,
    ) -> Self {
        let accounts = Arc::new(AccountCache::new(history.clone(), &config.cache));
        let validators = ValidatorChain::standard(&config.validation, core.clone(), accounts.clone());
        let resolver = ResultResolver::new(core, history);
        Self::new(config, network, validators, resolver, accounts)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ResultResolver {
        &self.resolver
    }

    pub fn accounts(&self) -> &Arc<AccountCache> {
        &self.accounts
    }

    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }

    /// Submits under the configured `submit_timeout`.
    pub async fn submit(
        &self,
        raw_envelope: &str,
        network_passphrase: &str,
    ) -> Result<SubmissionResult, GatewayError> {
        let deadline = Instant::now() + self.config.submit_timeout;
        self.submit_with_deadline(raw_envelope, network_passphrase, deadline)
            .await
    }

    pub async fn submit_with_deadline(
        &self,
        raw_envelope: &str,
        network_passphrase: &str,
        deadline: Instant,
    ) -> Result<SubmissionResult, GatewayError> {
        let info = decode(raw_envelope, network_passphrase)?;
        let hash = info.hash.clone();
        debug!(
            hash = %hash,
            network = network_name(network_passphrase),
            source = %info.source_address,
            "envelope decoded"
        );

        let not_submitted = || GatewayError::Timeout {
            hash: hash.clone(),
            submitted: false,
        };

        timeout_at(deadline, self.validators.validate(&info))
            .await
            .map_err(|_| not_submitted())??;

        match timeout_at(deadline, self.resolver.resolve(&hash)).await {
            Ok(Ok(resolution)) if resolution.is_resolved() => {
                info!(hash = %hash, "transaction already applied, not resubmitting");
                return Ok(resolution.into_result(&hash));
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(hash = %hash, error = %e, "pre-submit lookup failed"),
            Err(_) => return Err(not_submitted()),
        }

        self.forward(&info, deadline).await?;
        self.poll(&hash, deadline).await
    }

    /// Idempotent lookup of a hash's current outcome.
    pub async fn result_by_hash(&self, hash: &str) -> Result<SubmissionResult, GatewayError> {
        Ok(self.resolver.result_by_hash(hash).await?)
    }

    async fn forward(&self, info: &EnvelopeInfo, deadline: Instant) -> Result<(), GatewayError> {
        let status = timeout_at(deadline, self.network.submit(&info.raw))
            .await
            .map_err(|_| GatewayError::Timeout {
                hash: info.hash.clone(),
                submitted: true,
            })??;

        match status {
            SubmitStatus::Pending | SubmitStatus::Duplicate => {
                info!(hash = %info.hash, status = ?status, "transaction accepted by ledger node");
                Ok(())
            }
            SubmitStatus::TryAgainLater => Err(GatewayError::NetworkBusy),
            SubmitStatus::Error { result } => {
                info!(hash = %info.hash, reason = %result, "ledger node rejected transaction");
                Err(GatewayError::NetworkRejection { reason: result })
            }
        }
    }

    async fn poll(&self, hash: &str, deadline: Instant) -> Result<SubmissionResult, GatewayError> {
        let poll = &self.config.poll;
        let max_attempts = poll.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match timeout_at(deadline, self.resolver.resolve(hash)).await {
                Err(_) => break,
                Ok(Ok(resolution)) if resolution.is_resolved() => {
                    debug!(hash, attempt, source = resolution.source().as_str(), "result resolved");
                    return Ok(resolution.into_result(hash));
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) if e.is_transient() => {
                    debug!(hash, attempt, error = %e, "transient store error while polling");
                }
                Ok(Err(e)) => return Err(e.into()),
            }

            if attempt >= max_attempts || Instant::now() >= deadline {
                break;
            }
            sleep_until((Instant::now() + poll.interval_for(attempt)).min(deadline)).await;
        }

        warn!(hash, attempts = attempt, "no terminal result before deadline");
        Err(GatewayError::Timeout {
            hash: hash.to_string(),
            submitted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::config::{PollConfig, TEST_NETWORK_PASSPHRASE};
    use crate::fixtures::{self, ScriptedNetwork};
    use crate::store::{MemoryCoreStore, MemoryHistoryStore, StoreError};
    use std::time::Duration;

    struct Harness {
        core: Arc<MemoryCoreStore>,
        history: Arc<MemoryHistoryStore>,
        network: Arc<ScriptedNetwork>,
        coordinator: SubmissionCoordinator,
    }

    fn harness(status: SubmitStatus) -> Harness {
        let core = Arc::new(MemoryCoreStore::new());
        let history = Arc::new(MemoryHistoryStore::new());
        let network = Arc::new(ScriptedNetwork::new(status));

        for (seed, kind) in [(1u8, AccountType::RegisteredUser), (2, AccountType::Merchant)] {
            let address = fixtures::keypair(seed).address();
            core.set_signers(address.clone(), vec![fixtures::master_signer(&address)]);
            history.insert_account(Account::new(seed as u64, address, kind));
        }

        let config = GatewayConfig {
            submit_timeout: Duration::from_secs(5),
            poll: PollConfig {
                max_attempts: 10,
                initial_interval: Duration::from_millis(100),
                max_interval: Duration::from_secs(1),
                multiplier: 2,
            },
            ..GatewayConfig::default()
        };
        let coordinator = SubmissionCoordinator::assemble(
            config,
            core.clone(),
            history.clone(),
            network.clone(),
        );
        Harness {
            core,
            history,
            network,
            coordinator,
        }
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_network() {
        let h = harness(SubmitStatus::Pending);
        let err = h
            .coordinator
            .submit("!!!", TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
        assert_eq!(h.network.calls(), 0);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_network() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(3).address(), 1);
        let err = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Validation(crate::validation::ValidationError::UnknownAccount { .. })
        ));
        assert_eq!(h.network.calls(), 0);
    }

    #[tokio::test]
    async fn rejection_is_surfaced_verbatim_without_retry() {
        let h = harness(SubmitStatus::Error {
            result: "tx_bad_seq".into(),
        });
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let err = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::NetworkRejection {
                reason: "tx_bad_seq".into()
            }
        );
        assert_eq!(h.network.calls(), 1);
        assert_eq!(h.core.result_queries(), 1);
    }

    #[tokio::test]
    async fn busy_node_is_retryable() {
        let h = harness(SubmitStatus::TryAgainLater);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let err = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NetworkBusy);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unreachable_node_is_network_unavailable() {
        let h = harness(SubmitStatus::Pending);
        h.network.set_unreachable(true);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let err = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NetworkUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_core_records_result() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let hash = decode(&raw, TEST_NETWORK_PASSPHRASE).unwrap().hash;

        let core = h.core.clone();
        let record_hash = hash.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            core.insert_result(fixtures::result_record(&record_hash, 11, true));
        });

        let result = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap();
        assert!(result.found && result.succeeded);
        assert_eq!(result.ledger, Some(11));
        assert_eq!(result.source, crate::result::ResultSource::Core);
        assert_eq!(h.network.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_yields_timeout_with_hash() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let hash = decode(&raw, TEST_NETWORK_PASSPHRASE).unwrap().hash;

        let start = Instant::now();
        let err = h
            .coordinator
            .submit_with_deadline(&raw, TEST_NETWORK_PASSPHRASE, start + Duration::from_secs(2))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GatewayError::Timeout {
                hash,
                submitted: true
            }
        );
        assert!(start.elapsed() <= Duration::from_secs(2) + Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_bounded() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);

        let start = Instant::now();
        let err = h
            .coordinator
            .submit_with_deadline(&raw, TEST_NETWORK_PASSPHRASE, start + Duration::from_secs(60))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Timeout { submitted: true, .. }));
        // One pre-submit lookup plus max_attempts polls.
        assert_eq!(h.history.result_queries(), 11);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_validation_is_cut_off_by_deadline() {
        let h = harness(SubmitStatus::Pending);
        h.history.set_latency(Some(Duration::from_secs(60)));
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);

        let err = h
            .coordinator
            .submit_with_deadline(
                &raw,
                TEST_NETWORK_PASSPHRASE,
                Instant::now() + Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout { submitted: false, .. }));
        assert_eq!(h.network.calls(), 0);
    }

    #[tokio::test]
    async fn already_applied_hash_is_not_resubmitted() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let hash = decode(&raw, TEST_NETWORK_PASSPHRASE).unwrap().hash;
        h.history.insert_result(fixtures::result_record(&hash, 3, true));

        let result = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap();
        assert_eq!(result.ledger, Some(3));
        assert_eq!(h.network.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_store_errors_keep_polling() {
        let h = harness(SubmitStatus::Pending);
        let raw = fixtures::signed_payment(&fixtures::keypair(1), &fixtures::keypair(2).address(), 1);
        let hash = decode(&raw, TEST_NETWORK_PASSPHRASE).unwrap().hash;

        let core = h.core.clone();
        let history = h.history.clone();
        tokio::spawn(async move {
            // Let validation through, then knock both stores out briefly.
            tokio::time::sleep(Duration::from_millis(50)).await;
            history.set_available(false);
            core.set_available(false);
            tokio::time::sleep(Duration::from_millis(400)).await;
            core.insert_result(fixtures::result_record(&hash, 8, true));
            core.set_available(true);
            history.set_available(true);
        });

        let result = h
            .coordinator
            .submit(&raw, TEST_NETWORK_PASSPHRASE)
            .await
            .unwrap();
        assert_eq!(result.ledger, Some(8));
    }

    #[tokio::test]
    async fn result_by_hash_surfaces_store_errors() {
        let h = harness(SubmitStatus::Pending);
        h.history.set_available(false);
        let err = h.coordinator.result_by_hash("abc").await.unwrap_err();
        assert!(matches!(err, GatewayError::Store(StoreError::Unavailable(_))));
    }
}
