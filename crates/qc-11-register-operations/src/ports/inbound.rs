//! # Driving Ports (API - Inbound)
//!
//! The transaction-level interface other subsystems use. Block production
//! builds, the mempool checks, consensus commits.

use crate::domain::Transaction;
use crate::errors::ServiceError;

/// Transaction-level register operations.
pub trait RegisterOperationsApi: Send + Sync {
    /// Author `tx`'s register stream from current store state.
    ///
    /// The stream must be empty on entry. On failure it is left empty.
    fn build_transaction(&self, tx: &mut Transaction) -> Result<(), ServiceError>;

    /// Verify `tx` against its stream without touching the store.
    fn check_transaction(&self, tx: &Transaction) -> Result<(), ServiceError>;

    /// Verify `tx` and commit every post-state, all or nothing with respect
    /// to operation failures.
    fn commit_transaction(&self, tx: &Transaction) -> Result<(), ServiceError>;

    /// [`Self::check_transaction`] for each transaction, in order.
    fn check_transactions(&self, txs: &[Transaction]) -> Vec<Result<(), ServiceError>> {
        txs.iter().map(|tx| self.check_transaction(tx)).collect()
    }
}
