//! # Register Operations Service
//!
//! Transaction-level driver over the [`RegisterController`].
//!
//! ## Passes
//!
//! | Entry point | Flags | Lease | Store writes |
//! |-------------|-------|-------|--------------|
//! | `build_transaction` | BUILD | none | never |
//! | `check_transaction` | MEMPOOL | none | never |
//! | `commit_transaction` | MEMPOOL pre-pass, then WRITE | all `from` registers | one per operation |
//!
//! The pre-pass runs under the commit lease as a dry run, stale pre-states
//! included, so an operation rejected late in a transaction cannot leave
//! earlier operations committed. Store failures during the WRITE pass
//! are still fatal mid-transaction; atomic multi-register writes belong to
//! the store.

use crate::controller::{ExecutionContext, PendingStates, RegisterController};
use crate::domain::{Flags, OperationStream, Transaction};
use crate::errors::{ConfigError, ServiceError};
use crate::ports::inbound::RegisterOperationsApi;
use parking_lot::RwLock;
use qc_04_state_management::{InMemoryRegisterStore, RegisterLease, RegisterStore};
use rayon::prelude::*;
use std::env;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Register operations service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Maximum operations in one transaction.
    pub max_operations_per_tx: usize,
    /// Maximum register stream size in bytes.
    pub max_stream_bytes: usize,
    /// Run a MEMPOOL pass before the WRITE pass on commit.
    pub verify_before_commit: bool,
    /// Batch size at which `check_transactions` goes parallel.
    pub parallel_threshold: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_operations_per_tx: 64,
            max_stream_bytes: 256 * 1024,
            verify_before_commit: true,
            parallel_threshold: 4,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_REGOPS_MAX_OPERATIONS`: Operations per transaction (default: 64)
    /// - `QC_REGOPS_MAX_STREAM_BYTES`: Stream size limit (default: 262144)
    /// - `QC_REGOPS_VERIFY_BEFORE_COMMIT`: Pre-pass on commit (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_operations_per_tx: env::var("QC_REGOPS_MAX_OPERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_operations_per_tx),

            max_stream_bytes: env::var("QC_REGOPS_MAX_STREAM_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_stream_bytes),

            verify_before_commit: env::var("QC_REGOPS_VERIFY_BEFORE_COMMIT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.verify_before_commit),

            parallel_threshold: defaults.parallel_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_operations_per_tx == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_operations_per_tx",
            });
        }
        if self.max_stream_bytes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_stream_bytes",
            });
        }
        if self.parallel_threshold == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "parallel_threshold",
            });
        }
        Ok(())
    }
}

/// Statistics for the register operations service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Transactions whose stream was built.
    pub transactions_built: u64,
    /// Transactions that passed a mempool check.
    pub transactions_checked: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rejected by any entry point.
    pub transactions_rejected: u64,
    /// Operations that completed, in any role.
    pub operations_executed: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The main register operations service.
pub struct RegisterOperationService<S> {
    config: ServiceConfig,
    controller: RegisterController<S>,
    stats: RwLock<ServiceStats>,
}

impl<S: RegisterStore> RegisterOperationService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            config,
            controller: RegisterController::new(store),
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn controller(&self) -> &RegisterController<S> {
        &self.controller
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    fn check_shape(&self, tx: &Transaction) -> Result<(), ServiceError> {
        let count = tx.operations.len();
        if count == 0 {
            return Err(ServiceError::EmptyTransaction);
        }
        if count > self.config.max_operations_per_tx {
            return Err(ServiceError::TooManyOperations {
                count,
                max: self.config.max_operations_per_tx,
            });
        }
        self.check_stream_size(&tx.register_stream)
    }

    fn check_stream_size(&self, stream: &OperationStream) -> Result<(), ServiceError> {
        if stream.len() > self.config.max_stream_bytes {
            return Err(ServiceError::StreamTooLarge {
                size: stream.len(),
                max: self.config.max_stream_bytes,
            });
        }
        Ok(())
    }

    /// Run every operation of `tx` with `flags` over `stream`.
    fn run_pass(
        &self,
        tx: &Transaction,
        flags: Flags,
        stream: &mut OperationStream,
        lease: Option<&RegisterLease<'_>>,
    ) -> Result<(), ServiceError> {
        let mut pending = PendingStates::new();
        let mut ctx = ExecutionContext::new(tx.caller, flags, tx.timestamp, stream, &mut pending);
        ctx.lease = lease;

        for (index, operation) in tx.operations.iter().enumerate() {
            self.controller
                .execute_leased(&operation.kind, &operation.params(), &mut ctx)
                .map_err(|source| ServiceError::Operation { index, source })?;
            self.stats.write().operations_executed += 1;
        }
        Ok(())
    }

    /// MEMPOOL pass over a rewound copy of `tx`'s stream.
    fn verify(&self, tx: &Transaction) -> Result<(), ServiceError> {
        let mut stream = tx.register_stream.clone();
        stream.rewind();
        self.run_pass(tx, Flags::MEMPOOL, &mut stream, None)?;
        stream.ensure_exhausted()?;
        Ok(())
    }

    fn reject(&self, tx: &Transaction, stage: &'static str, err: ServiceError) -> ServiceError {
        self.stats.write().transactions_rejected += 1;
        debug!(
            caller = %tx.caller,
            stage,
            error_kind = ?err.operation_kind(),
            error = %err,
            "transaction rejected"
        );
        err
    }
}

impl<S: RegisterStore> RegisterOperationsApi for RegisterOperationService<S> {
    #[instrument(skip(self, tx), fields(caller = %tx.caller, operations = tx.operations.len()))]
    fn build_transaction(&self, tx: &mut Transaction) -> Result<(), ServiceError> {
        if !tx.register_stream.is_empty() {
            return Err(self.reject(tx, "build", ServiceError::StreamNotEmpty));
        }
        if let Err(err) = self.check_shape(tx) {
            return Err(self.reject(tx, "build", err));
        }

        let mut stream = OperationStream::new();
        let built = self
            .run_pass(tx, Flags::BUILD, &mut stream, None)
            .and_then(|()| self.check_stream_size(&stream));
        if let Err(err) = built {
            return Err(self.reject(tx, "build", err));
        }

        tx.register_stream = stream;
        self.stats.write().transactions_built += 1;
        info!(stream_bytes = tx.register_stream.len(), "transaction built");
        Ok(())
    }

    #[instrument(skip(self, tx), fields(caller = %tx.caller, operations = tx.operations.len()))]
    fn check_transaction(&self, tx: &Transaction) -> Result<(), ServiceError> {
        let result = self.check_shape(tx).and_then(|()| self.verify(tx));
        if let Err(err) = result {
            return Err(self.reject(tx, "check", err));
        }
        self.stats.write().transactions_checked += 1;
        debug!("transaction passed mempool check");
        Ok(())
    }

    #[instrument(skip(self, tx), fields(caller = %tx.caller, operations = tx.operations.len()))]
    fn commit_transaction(&self, tx: &Transaction) -> Result<(), ServiceError> {
        if let Err(err) = self.check_shape(tx) {
            return Err(self.reject(tx, "commit", err));
        }

        let lease = self.controller.leases().acquire(tx.registers());

        // Under the lease the pre-pass sees the state the WRITE pass will.
        if self.config.verify_before_commit {
            if let Err(err) = self.verify(tx) {
                return Err(self.reject(tx, "commit", err));
            }
        }

        let mut stream = tx.register_stream.clone();
        stream.rewind();
        let committed = self
            .run_pass(tx, Flags::WRITE, &mut stream, Some(&lease))
            .and_then(|()| stream.ensure_exhausted().map_err(ServiceError::from));
        if let Err(err) = committed {
            if !matches!(err, ServiceError::Operation { index: 0, .. }) {
                warn!(
                    caller = %tx.caller,
                    error = %err,
                    "transaction partially committed"
                );
            }
            return Err(self.reject(tx, "commit", err));
        }

        self.stats.write().transactions_committed += 1;
        info!(registers = tx.registers().len(), "transaction committed");
        Ok(())
    }

    fn check_transactions(&self, txs: &[Transaction]) -> Vec<Result<(), ServiceError>> {
        if txs.len() < self.config.parallel_threshold {
            return txs.iter().map(|tx| self.check_transaction(tx)).collect();
        }
        txs.par_iter().map(|tx| self.check_transaction(tx)).collect()
    }
}

/// Service over an in-memory store with default configuration.
pub fn create_test_service() -> RegisterOperationService<InMemoryRegisterStore> {
    RegisterOperationService {
        config: ServiceConfig::default(),
        controller: RegisterController::new(InMemoryRegisterStore::new()),
        stats: RwLock::new(ServiceStats::default()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
