//! # Concurrency
//!
//! Commits on one register serialize through its lease; independent
//! transactions verify in parallel.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use qc_11_register_operations::prelude::*;
    use std::thread;
    use std::time::Duration;

    const WORKERS: u64 = 8;
    const ROUNDS: u64 = 5;

    #[test]
    fn test_concurrent_commits_on_one_register() {
        let validator = node();

        thread::scope(|scope| {
            for worker in 0..WORKERS {
                let validator = &validator;
                scope.spawn(move || {
                    for round in 0..ROUNDS {
                        let timestamp = GENESIS_TIME + 1 + worker * ROUNDS + round;
                        // Build against whatever the store holds now; a
                        // competing commit may make the stream stale.
                        loop {
                            let mut tx = bob_spends(1, timestamp);
                            validator.build_transaction(&mut tx).unwrap();
                            match validator.commit_transaction(&tx) {
                                Ok(()) => break,
                                Err(err) => assert_eq!(
                                    err.operation_kind(),
                                    Some(ErrorKind::StalePrestate)
                                ),
                            }
                        }
                    }
                });
            }
        });

        assert_eq!(balance_of(&validator, bob_account()), 500 - WORKERS * ROUNDS);
        assert_eq!(validator.stats().transactions_committed, WORKERS * ROUNDS);
        assert_eq!(validator.controller().leases().held_count(), 0);
    }

    #[test]
    fn test_lease_blocks_competing_commit() {
        let validator = node();
        let mut tx = bob_spends(5, GENESIS_TIME + 1);
        validator.build_transaction(&mut tx).unwrap();

        let held = validator.controller().leases().acquire([bob_account()]);
        assert!(validator
            .controller()
            .leases()
            .try_acquire([bob_account(), alice_account()])
            .is_none());

        thread::scope(|scope| {
            let committer = scope.spawn(|| validator.commit_transaction(&tx));
            // The committer cannot finish while the lease is held.
            thread::sleep(Duration::from_millis(50));
            assert_eq!(balance_of(&validator, bob_account()), 500);
            drop(held);
            committer.join().unwrap().unwrap();
        });

        assert_eq!(balance_of(&validator, bob_account()), 495);
    }

    #[test]
    fn test_parallel_mempool_batch() {
        let producer = node();
        let mempool = node();

        let mut batch = Vec::new();
        for i in 0..32u64 {
            let mut tx = if i % 2 == 0 {
                alice_saves(i + 1, GENESIS_TIME + i)
            } else {
                bob_spends(i, GENESIS_TIME + i)
            };
            producer.build_transaction(&mut tx).unwrap();
            batch.push(tx);
        }
        // One forged entry in the middle of the batch.
        batch[17].caller = ALICE_KEY;

        let results = mempool.check_transactions(&batch);
        assert_eq!(results.len(), 32);
        for (i, result) in results.iter().enumerate() {
            if i == 17 {
                assert_eq!(
                    result.as_ref().unwrap_err().operation_kind(),
                    Some(ErrorKind::Unauthorized)
                );
            } else {
                assert!(result.is_ok(), "transaction {i} rejected: {result:?}");
            }
        }
        assert_eq!(mempool.controller().store().write_count(), 0);
    }
}
