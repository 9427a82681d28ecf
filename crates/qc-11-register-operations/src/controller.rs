//! # Execution Controller
//!
//! Every register operation runs through one path:
//!
//! ```text
//! pre-state ──→ owner check ──→ kind check ──→ business logic ──→ post-state
//!  (store or stream)                              (catalog)           │
//!                                                                     ▼
//!        commit ←── stale check ←── verify checksum ←── validate + checksum
//! ```
//!
//! [`Flags`] decide where the pre-state comes from, whether the checksum is
//! embedded or verified, and whether the post-state reaches the store. The
//! builder and the validator share this code, so a stream produced by one is
//! reproduced byte-for-byte by the other.
//!
//! MEMPOOL runs the same checks as WRITE, including that the store still
//! holds the embedded pre-state, and never writes. A Credit must be preceded
//! in the same transaction by the Debit that funds it.

use crate::domain::{
    Flags, Marker, OperationKind, OperationParams, OperationStream, Role, Transaction,
};
use crate::errors::OperationError;
use qc_04_state_management::{
    LeaseManager, RegisterLease, RegisterState, RegisterStore, StateError,
};
use shared_types::{Address, Timestamp};
use std::collections::HashMap;
use tracing::{debug, info, trace};

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// Transaction-local overlay: post-states produced earlier in the same
/// transaction that are not in the store, and debits no credit has claimed
/// yet. Later operations on the same register see these states first.
#[derive(Debug, Clone, Default)]
pub struct PendingStates {
    states: HashMap<Address, RegisterState>,
    debits: Vec<OperationParams>,
}

impl PendingStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&RegisterState> {
        self.states.get(address)
    }

    pub fn record(&mut self, address: Address, state: RegisterState) {
        self.states.insert(address, state);
    }

    pub fn record_debit(&mut self, debit: OperationParams) {
        self.debits.push(debit);
    }

    /// Consume the debit that funds `credit`: same amount, moving from the
    /// credit's source into the credited register.
    pub fn claim_debit(&mut self, credit: &OperationParams) -> bool {
        let matching = self.debits.iter().position(|debit| {
            debit.from == credit.to && debit.to == credit.from && debit.amount == credit.amount
        });
        match matching {
            Some(index) => {
                self.debits.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Debits not yet claimed by a credit.
    pub fn unclaimed_debits(&self) -> usize {
        self.debits.len()
    }

    /// Number of overlaid post-states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Everything one operation needs beyond its own parameters.
pub struct ExecutionContext<'a, 'l> {
    pub caller: Address,
    pub flags: Flags,
    /// Stamped onto the post-state.
    pub timestamp: Timestamp,
    pub stream: &'a mut OperationStream,
    /// Required for WRITE.
    pub lease: Option<&'a RegisterLease<'l>>,
    pub pending: &'a mut PendingStates,
}

impl<'a, 'l> ExecutionContext<'a, 'l> {
    pub fn new(
        caller: Address,
        flags: Flags,
        timestamp: Timestamp,
        stream: &'a mut OperationStream,
        pending: &'a mut PendingStates,
    ) -> Self {
        Self {
            caller,
            flags,
            timestamp,
            stream,
            lease: None,
            pending,
        }
    }

    #[must_use]
    pub fn with_lease(mut self, lease: &'a RegisterLease<'l>) -> Self {
        self.lease = Some(lease);
        self
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Runs register operations against a [`RegisterStore`].
pub struct RegisterController<S> {
    store: S,
    leases: LeaseManager,
}

impl<S: RegisterStore> RegisterController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            leases: LeaseManager::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lease manager guarding commits through this controller.
    pub fn leases(&self) -> &LeaseManager {
        &self.leases
    }

    /// Execute one operation against `tx`'s register stream.
    ///
    /// With WRITE, a lease on `from` is taken for the duration of the call.
    /// The operation runs with an empty overlay, so a Credit, which needs an
    /// earlier Debit, must go through [`Self::execute_leased`].
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &self,
        op: &OperationKind,
        from: Address,
        to: Address,
        amount: u64,
        caller: Address,
        flags: Flags,
        tx: &mut Transaction,
    ) -> Result<(), OperationError> {
        let lease = flags.commits().then(|| self.leases.acquire([from]));
        let mut pending = PendingStates::new();
        let mut ctx = ExecutionContext::new(
            caller,
            flags,
            tx.timestamp,
            &mut tx.register_stream,
            &mut pending,
        );
        ctx.lease = lease.as_ref();

        let params = OperationParams { from, to, amount };
        self.execute_leased(op, &params, &mut ctx).map(|_| ())
    }

    /// Execute one operation with a caller-held lease and overlay, returning
    /// the post-state.
    pub fn execute_leased(
        &self,
        op: &OperationKind,
        params: &OperationParams,
        ctx: &mut ExecutionContext<'_, '_>,
    ) -> Result<RegisterState, OperationError> {
        let result = self.run(op, params, ctx);
        if let Err(err) = &result {
            debug!(
                operation = op.name(),
                register = %params.from,
                caller = %ctx.caller,
                role = ?ctx.flags.role(),
                error_kind = ?err.kind(),
                error = %err,
                "register operation rejected"
            );
        }
        result
    }

    fn run(
        &self,
        op: &OperationKind,
        params: &OperationParams,
        ctx: &mut ExecutionContext<'_, '_>,
    ) -> Result<RegisterState, OperationError> {
        let from = params.from;
        if ctx.flags.commits() && !ctx.lease.is_some_and(|lease| lease.covers(&from)) {
            return Err(OperationError::LeaseNotHeld { address: from });
        }

        let pre = self.prestate(op, params, ctx)?;

        if pre.owner != ctx.caller {
            return Err(OperationError::Unauthorized {
                address: from,
                owner: pre.owner,
                caller: ctx.caller,
            });
        }
        if let Some(expected) = op.expected_kind() {
            if pre.kind != expected {
                return Err(OperationError::WrongRegisterType {
                    address: from,
                    expected,
                    actual: pre.kind,
                });
            }
        }

        if matches!(op, OperationKind::Credit) && !ctx.pending.claim_debit(params) {
            return Err(OperationError::UnmatchedCredit {
                address: from,
                debited: params.to,
                amount: params.amount,
            });
        }

        let view = op.apply(&pre, params)?;

        let invalid = |e: StateError| OperationError::invalid_post_state(from, &e);
        let mut post = pre.clone();
        post.clear_state();
        post.timestamp = ctx.timestamp;
        post.owner = view.owner;
        post.set_object(&view.object).map_err(invalid)?;
        post.validate().map_err(invalid)?;
        let checksum = post.checksum().map_err(invalid)?;

        if ctx.flags.embeds_poststate() {
            ctx.stream.push_poststate_checksum(&checksum);
        }
        if ctx.flags.verifies() {
            ctx.stream.expect_marker(Marker::Poststate)?;
            let claimed = ctx.stream.pop_checksum()?;
            if claimed != checksum {
                return Err(OperationError::ChecksumMismatch {
                    address: from,
                    claimed,
                    computed: checksum,
                });
            }
        }

        match ctx.flags.role() {
            Role::Validator => self.commit(op, from, &pre, &post, ctx.pending)?,
            Role::Mempool => {
                self.ensure_fresh(op, from, &pre, ctx.pending)?;
                ctx.pending.record(from, post.clone());
            }
            Role::Builder => ctx.pending.record(from, post.clone()),
        }
        if matches!(op, OperationKind::Debit) {
            ctx.pending.record_debit(*params);
        }
        trace!(
            operation = op.name(),
            register = %from,
            checksum = %checksum,
            "register operation executed"
        );
        Ok(post)
    }

    /// Steps 1-2: read and embed, pop from the stream, or synthesize for
    /// Create.
    fn prestate(
        &self,
        op: &OperationKind,
        params: &OperationParams,
        ctx: &mut ExecutionContext<'_, '_>,
    ) -> Result<RegisterState, OperationError> {
        let from = params.from;
        if let OperationKind::Create { register, .. } = op {
            if self.lookup(&from, ctx.pending)?.is_some() {
                return Err(OperationError::RegisterExists { address: from });
            }
            if !register.matches_address(&from) {
                return Err(OperationError::AddressTagMismatch {
                    address: from,
                    kind: *register,
                });
            }
            return Ok(RegisterState::empty(ctx.caller, *register));
        }

        if ctx.flags.embeds_prestate() {
            let pre = self
                .lookup(&from, ctx.pending)?
                .ok_or(OperationError::RegisterNotFound { address: from })?;
            ctx.stream.push_prestate(&pre)?;
            Ok(pre)
        } else {
            ctx.stream.expect_marker(Marker::Prestate)?;
            Ok(ctx.stream.pop_state()?)
        }
    }

    fn lookup(
        &self,
        address: &Address,
        pending: &PendingStates,
    ) -> Result<Option<RegisterState>, OperationError> {
        if let Some(state) = pending.get(address) {
            return Ok(Some(state.clone()));
        }
        Ok(self.store.read(address)?)
    }

    /// The current state of `from`, overlay first, must equal `pre`.
    /// Create's absence was checked when its pre-state was synthesized.
    fn ensure_fresh(
        &self,
        op: &OperationKind,
        from: Address,
        pre: &RegisterState,
        pending: &PendingStates,
    ) -> Result<(), OperationError> {
        if !op.creates_register() && self.lookup(&from, pending)?.as_ref() != Some(pre) {
            return Err(OperationError::StalePrestate { address: from });
        }
        Ok(())
    }

    fn commit(
        &self,
        op: &OperationKind,
        from: Address,
        pre: &RegisterState,
        post: &RegisterState,
        pending: &PendingStates,
    ) -> Result<(), OperationError> {
        self.ensure_fresh(op, from, pre, pending)?;
        self.store.write(&from, post)?;
        info!(
            operation = op.name(),
            register = %from,
            timestamp = post.timestamp,
            "register state committed"
        );
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
