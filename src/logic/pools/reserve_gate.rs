use alloy_primitives::U256;
use parking_lot::RwLock;
use strum_macros::Display;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateOutcome {
    Changed,
    Unchanged,
}

impl UpdateOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, UpdateOutcome::Changed)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("stale update: block {observed} is older than last applied block {last}")]
    StaleUpdate { observed: u64, last: u64 },
}

/// Reserves together with the block they were last observed at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReserveRecord {
    pub reserve0: U256,
    pub reserve1: U256,
    pub last_block: Option<u64>,
}

/// Single-writer gate in front of a pool's reserves.
///
/// The gate is `Idle` between calls. Inside [`ReserveGate::apply`] the write guard is the
/// `Applying` state: readers either see the previous record or the new one, never a mix.
/// Several updates for the same block are accepted, older blocks are rejected.
#[derive(Debug, Default)]
pub struct ReserveGate {
    record: RwLock<ReserveRecord>,
}

impl ReserveGate {
    pub fn new(reserve0: U256, reserve1: U256) -> Self {
        Self { record: RwLock::new(ReserveRecord { reserve0, reserve1, last_block: None }) }
    }

    pub fn apply(&self, reserve0: U256, reserve1: U256, block: u64) -> Result<UpdateOutcome, UpdateError> {
        let mut record = self.record.write();

        if let Some(last) = record.last_block {
            if block < last {
                return Err(UpdateError::StaleUpdate { observed: block, last });
            }
        }
        record.last_block = Some(block);

        if record.reserve0 == reserve0 && record.reserve1 == reserve1 {
            return Ok(UpdateOutcome::Unchanged);
        }
        record.reserve0 = reserve0;
        record.reserve1 = reserve1;

        Ok(UpdateOutcome::Changed)
    }

    pub fn snapshot(&self) -> ReserveRecord {
        *self.record.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn reserves(r0: u64, r1: u64) -> (U256, U256) {
        (U256::from(r0), U256::from(r1))
    }

    #[test]
    fn test_first_update_changes() -> eyre::Result<()> {
        let gate = ReserveGate::default();
        let (r0, r1) = reserves(100, 200);
        assert_eq!(gate.apply(r0, r1, 10)?, UpdateOutcome::Changed);

        let record = gate.snapshot();
        assert_eq!((record.reserve0, record.reserve1, record.last_block), (r0, r1, Some(10)));
        Ok(())
    }

    #[test]
    fn test_identical_reserves_unchanged_but_block_advances() -> eyre::Result<()> {
        let gate = ReserveGate::default();
        let (r0, r1) = reserves(100, 200);
        gate.apply(r0, r1, 10)?;

        assert_eq!(gate.apply(r0, r1, 10)?, UpdateOutcome::Unchanged);
        assert_eq!(gate.apply(r0, r1, 12)?, UpdateOutcome::Unchanged);
        assert_eq!(gate.snapshot().last_block, Some(12));
        Ok(())
    }

    #[test]
    fn test_same_block_partial_updates() -> eyre::Result<()> {
        let gate = ReserveGate::default();
        gate.apply(U256::from(1), U256::from(2), 5)?;
        assert_eq!(gate.apply(U256::from(3), U256::from(4), 5)?, UpdateOutcome::Changed);
        assert_eq!(gate.snapshot().reserve0, U256::from(3));
        Ok(())
    }

    #[test]
    fn test_stale_update_rejected() -> eyre::Result<()> {
        let gate = ReserveGate::default();
        let (r0, r1) = reserves(100, 200);
        gate.apply(r0, r1, 10)?;

        let result = gate.apply(U256::from(1), U256::from(1), 9);
        assert_eq!(result, Err(UpdateError::StaleUpdate { observed: 9, last: 10 }));

        let record = gate.snapshot();
        assert_eq!((record.reserve0, record.reserve1, record.last_block), (r0, r1, Some(10)));
        Ok(())
    }

    #[test]
    fn test_initial_reserves_without_block() -> eyre::Result<()> {
        let (r0, r1) = reserves(7, 8);
        let gate = ReserveGate::new(r0, r1);
        assert_eq!(gate.snapshot().last_block, None);
        assert_eq!(gate.apply(r0, r1, 0)?, UpdateOutcome::Unchanged);
        Ok(())
    }

    #[test]
    fn test_readers_never_see_torn_reserves() {
        let gate = Arc::new(ReserveGate::default());

        let writer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                for block in 1..2_000u64 {
                    let _ = gate.apply(U256::from(block), U256::from(block * 2), block);
                }
            })
        };

        for _ in 0..2_000 {
            let record = gate.snapshot();
            assert_eq!(record.reserve1, record.reserve0 * U256::from(2));
        }

        assert!(writer.join().is_ok());
    }

    #[test]
    fn test_gate_usable_after_writer_panic() -> eyre::Result<()> {
        let gate = Arc::new(ReserveGate::default());
        gate.apply(U256::from(1), U256::from(2), 1)?;

        let panicked = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _guard = gate.record.write();
                panic!("writer died holding the lock");
            })
            .join()
        };
        assert!(panicked.is_err());

        assert_eq!(gate.snapshot().reserve0, U256::from(1));
        assert_eq!(gate.apply(U256::from(3), U256::from(4), 2)?, UpdateOutcome::Changed);
        assert_eq!(gate.snapshot().last_block, Some(2));
        Ok(())
    }
}
