//! # Integration Test Flows
//!
//! A block producer builds a transaction against its store, the mempool
//! checks it, and independent validators commit it against theirs.
//!
//! ## Flows Tested:
//!
//! 1. **Producer → Validators**: every validator reaches the same state
//! 2. **Producer → Mempool**: speculative checks never write
//! 3. **Tampering in transit**: wire-level edits are rejected by checksum
//! 4. **Create → use**: a register created and spent in one transaction
//! 5. **Stale streams**: a transaction built on superseded state is refused
//! 6. **Unfunded credits**: a credit needs the debit that pays for it

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use qc_04_state_management::{Account, RegisterKind, RegisterObject, RegisterStore};
    use qc_11_register_operations::prelude::*;
    use shared_crypto::hash;
    use shared_types::Address;

    const MALLORY_KEY: Address = Address::new([0x3A; 32]);

    // =============================================================================
    // PRODUCER → VALIDATORS
    // =============================================================================

    #[test]
    fn test_validators_converge_on_producer_state() {
        init_test_logging();
        let producer = node();
        let validators = [node(), node(), node()];

        let mut tx = alice_saves(250, GENESIS_TIME + 10);
        producer.build_transaction(&mut tx).unwrap();

        // The stream travels over the wire.
        let received = Transaction::decode(&tx.encode().unwrap()).unwrap();
        assert_eq!(received.hash().unwrap(), tx.hash().unwrap());

        for validator in &validators {
            validator.commit_transaction(&received).unwrap();
            assert_eq!(balance_of(validator, alice_account()), 750);
            assert_eq!(balance_of(validator, alice_savings()), 250);
        }
        producer.commit_transaction(&tx).unwrap();

        let reference = producer.controller().store().read(&alice_account()).unwrap();
        for validator in &validators {
            assert_eq!(
                validator.controller().store().read(&alice_account()).unwrap(),
                reference
            );
        }
    }

    #[test]
    fn test_stream_carries_post_state_checksum() {
        let producer = node();
        let validator = node();
        let mut tx = bob_spends(100, GENESIS_TIME + 1);
        producer.build_transaction(&mut tx).unwrap();
        validator.commit_transaction(&tx).unwrap();

        let mut stream = tx.register_stream.clone();
        stream.expect_marker(Marker::Prestate).unwrap();
        let pre = stream.pop_state().unwrap();
        assert_eq!(pre, account_state(BOB_KEY, 500));
        stream.expect_marker(Marker::Poststate).unwrap();
        let claimed = stream.pop_checksum().unwrap();

        let post = validator
            .controller()
            .store()
            .read(&bob_account())
            .unwrap()
            .unwrap();
        assert_eq!(post.timestamp, GENESIS_TIME + 1);
        assert_eq!(claimed, hash(&post.encode().unwrap()));
    }

    #[test]
    fn test_insufficient_funds_rejected_everywhere() {
        let producer = node();
        let mut tx = bob_spends(501, GENESIS_TIME + 1);
        let err = producer.build_transaction(&mut tx).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::InsufficientFunds));
        assert!(tx.register_stream.is_empty());
        assert_eq!(balance_of(&producer, bob_account()), 500);
    }

    // =============================================================================
    // PRODUCER → MEMPOOL
    // =============================================================================

    #[test]
    fn test_mempool_checks_are_side_effect_free() {
        let producer = node();
        let mempool = node();
        let mut tx = alice_saves(10, GENESIS_TIME + 5);
        producer.build_transaction(&mut tx).unwrap();

        for _ in 0..3 {
            mempool.check_transaction(&tx).unwrap();
        }
        assert_eq!(mempool.controller().store().write_count(), 0);
        assert_eq!(balance_of(&mempool, alice_account()), 1_000);
        assert_eq!(mempool.stats().transactions_checked, 3);
    }

    #[test]
    fn test_foreign_caller_rejected() {
        let producer = node();
        let mut tx = alice_saves(10, GENESIS_TIME + 5);
        producer.build_transaction(&mut tx).unwrap();

        // Bob replays Alice's stream as his own.
        let mut forged = tx.clone();
        forged.caller = BOB_KEY;
        let err = node().check_transaction(&forged).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::Unauthorized));
    }

    // =============================================================================
    // TAMPERING IN TRANSIT
    // =============================================================================

    #[test]
    fn test_amount_tampering_detected() {
        let producer = node();
        let validator = node();
        let mut tx = alice_saves(10, GENESIS_TIME + 5);
        producer.build_transaction(&mut tx).unwrap();

        let mut tampered = tx.clone();
        tampered.operations[0].amount = 900;
        let err = validator.commit_transaction(&tampered).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::ChecksumMismatch));
        assert_eq!(balance_of(&validator, alice_account()), 1_000);
        assert_eq!(validator.controller().store().write_count(), 0);
    }

    #[test]
    fn test_timestamp_tampering_detected() {
        let producer = node();
        let mut tx = alice_saves(10, GENESIS_TIME + 5);
        producer.build_transaction(&mut tx).unwrap();

        let mut tampered = tx.clone();
        tampered.timestamp += 1;
        let err = node().check_transaction(&tampered).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::ChecksumMismatch));
    }

    #[test]
    fn test_every_stream_byte_is_covered() {
        let producer = node();
        let mut tx = bob_spends(1, GENESIS_TIME + 1);
        producer.build_transaction(&mut tx).unwrap();

        let bytes = tx.register_stream.as_bytes().to_vec();
        for position in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[position] ^= 0x40;
            let mut forged = tx.clone();
            forged.register_stream = OperationStream::from_bytes(corrupted);

            let validator = node();
            assert!(
                validator.commit_transaction(&forged).is_err(),
                "flipping byte {position} went unnoticed"
            );
            assert_eq!(validator.controller().store().write_count(), 0);
        }
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let producer = node();
        let mut tx = alice_saves(10, GENESIS_TIME + 5);
        producer.build_transaction(&mut tx).unwrap();

        let bytes = tx.register_stream.as_bytes();
        let mut truncated = tx.clone();
        truncated.register_stream = OperationStream::from_bytes(bytes[..bytes.len() - 1].to_vec());
        let err = node().commit_transaction(&truncated).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::StreamFormat));
    }

    // =============================================================================
    // CREATE → USE
    // =============================================================================

    #[test]
    fn test_create_and_fund_in_one_transaction() {
        let producer = node();
        let validator = node();
        let fresh = account_address(0x44);
        let object = RegisterObject::from(Account::default());

        let mut tx = Transaction::new(ALICE_KEY, GENESIS_TIME + 20)
            .with_operation(Operation::create(fresh, &object).unwrap())
            .with_operation(Operation::debit(alice_account(), fresh, 300))
            .with_operation(Operation::credit(fresh, alice_account(), 300));
        producer.build_transaction(&mut tx).unwrap();
        validator.commit_transaction(&tx).unwrap();

        assert_eq!(balance_of(&validator, fresh), 300);
        assert_eq!(balance_of(&validator, alice_account()), 700);
        let created = validator.controller().store().read(&fresh).unwrap().unwrap();
        assert_eq!(created.owner, ALICE_KEY);
        assert_eq!(created.kind, RegisterKind::Account);

        // A second create on the same address is refused.
        let mut again = Transaction::new(ALICE_KEY, GENESIS_TIME + 21)
            .with_operation(Operation::create(fresh, &object).unwrap());
        let err = validator.build_transaction(&mut again).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::RegisterExists));
    }

    #[test]
    fn test_transfer_hands_over_control() {
        let producer = node();
        let mut tx = Transaction::new(ALICE_KEY, GENESIS_TIME + 30)
            .with_operation(Operation::transfer(alice_savings(), BOB_KEY));
        producer.build_transaction(&mut tx).unwrap();
        producer.commit_transaction(&tx).unwrap();

        let mut alice_again = Transaction::new(ALICE_KEY, GENESIS_TIME + 31)
            .with_operation(Operation::authorize(alice_savings()));
        let err = producer.build_transaction(&mut alice_again).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::Unauthorized));

        let mut bob = Transaction::new(BOB_KEY, GENESIS_TIME + 31)
            .with_operation(Operation::authorize(alice_savings()));
        producer.build_transaction(&mut bob).unwrap();
        producer.commit_transaction(&bob).unwrap();
    }

    // =============================================================================
    // STALE STREAMS
    // =============================================================================

    #[test]
    fn test_replay_after_commit_is_stale() {
        let validator = node();
        let mut tx = bob_spends(100, GENESIS_TIME + 1);
        node().build_transaction(&mut tx).unwrap();

        validator.commit_transaction(&tx).unwrap();
        let err = validator.commit_transaction(&tx).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::StalePrestate));
        assert_eq!(balance_of(&validator, bob_account()), 400);
    }

    #[test]
    fn test_forged_prestate_refused_at_admission() {
        // Mallory builds against a private store where Alice's account is hers.
        let forger = node();
        forger
            .controller()
            .store()
            .insert(alice_account(), account_state(MALLORY_KEY, 1_000_000));
        let mut tx = Transaction::new(MALLORY_KEY, GENESIS_TIME + 3)
            .with_operation(Operation::debit(alice_account(), bob_account(), 999_999));
        forger.build_transaction(&mut tx).unwrap();

        let honest = node();
        let checked = honest.check_transaction(&tx).unwrap_err();
        assert_eq!(checked.operation_kind(), Some(ErrorKind::StalePrestate));
        let committed = honest.commit_transaction(&tx).unwrap_err();
        assert_eq!(committed.operation_kind(), Some(ErrorKind::StalePrestate));
        assert_eq!(balance_of(&honest, alice_account()), 1_000);
    }

    #[test]
    fn test_failed_commit_leaves_no_partial_state() {
        let producer = node();
        let validator = node();
        let mut tx = alice_saves(100, GENESIS_TIME + 1);
        producer.build_transaction(&mut tx).unwrap();

        // Validator's savings moved on after the stream was built.
        let mut side = Transaction::new(ALICE_KEY, GENESIS_TIME + 2)
            .with_operation(Operation::authorize(alice_savings()));
        validator.build_transaction(&mut side).unwrap();
        validator.commit_transaction(&side).unwrap();
        let writes = validator.controller().store().write_count();

        let err = validator.commit_transaction(&tx).unwrap_err();
        assert!(matches!(err, ServiceError::Operation { index: 1, .. }));
        assert_eq!(err.operation_kind(), Some(ErrorKind::StalePrestate));
        assert_eq!(balance_of(&validator, alice_account()), 1_000);
        assert_eq!(validator.controller().store().write_count(), writes);
    }

    // =============================================================================
    // UNFUNDED CREDITS
    // =============================================================================

    #[test]
    fn test_credit_without_debit_rejected() {
        let producer = node();
        let mut tx = Transaction::new(ALICE_KEY, GENESIS_TIME + 40)
            .with_operation(Operation::credit(alice_account(), bob_account(), 1_000_000));
        let err = producer.build_transaction(&mut tx).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::UnmatchedCredit));

        // A hand-made stream for the same credit fails admission and commit.
        let pre = account_state(ALICE_KEY, 1_000);
        let mut post = account_state(ALICE_KEY, 1_001_000);
        post.timestamp = GENESIS_TIME + 40;
        tx.register_stream.push_prestate(&pre).unwrap();
        tx.register_stream.push_poststate_checksum(&post.checksum().unwrap());

        let validator = node();
        let err = validator.check_transaction(&tx).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::UnmatchedCredit));
        let err = validator.commit_transaction(&tx).unwrap_err();
        assert_eq!(err.operation_kind(), Some(ErrorKind::UnmatchedCredit));
        assert_eq!(balance_of(&validator, alice_account()), 1_000);
        assert_eq!(validator.controller().store().write_count(), 0);
    }
}
