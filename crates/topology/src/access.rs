//! Access strategies for slot resolution.
//!
//! A strategy adjusts a `(slot index, replica offset)` pair before the ring
//! resolves the index to a node. Strategies are a closed set of stateless
//! transforms composed left to right, each consuming the previous output and
//! receiving the ring's slot count as context.

/// A single slot-index transform.
///
/// To address the `r`-th replica of a partition, compose
/// `[ReplicaAt(r), Wrap]`: the first moves the index `r` slots clockwise and
/// records the rank, the second folds the result back into the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStrategy {
    /// Leave the index and replica untouched.
    Identity,
    /// Move to the replica `rank` copies clockwise from the primary slot.
    ReplicaAt(usize),
    /// Fold the index back into `[0, slot_count)`.
    Wrap,
}

impl AccessStrategy {
    /// Transforms `(index, replica)` given the ring's slot count.
    pub fn apply(self, index: usize, replica: usize, slot_count: usize) -> (usize, usize) {
        match self {
            AccessStrategy::Identity => (index, replica),
            AccessStrategy::ReplicaAt(rank) => (index + rank, rank),
            AccessStrategy::Wrap => {
                if slot_count == 0 {
                    (index, replica)
                } else {
                    (index % slot_count, replica)
                }
            }
        }
    }
}

/// Applies `strategies` in sequence, seeding the replica offset with 0.
pub fn apply_all(
    strategies: &[AccessStrategy],
    index: usize,
    slot_count: usize,
) -> (usize, usize) {
    strategies
        .iter()
        .fold((index, 0), |(index, replica), strategy| {
            strategy.apply(index, replica, slot_count)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_the_pair() {
        assert_eq!(apply_all(&[AccessStrategy::Identity], 5, 9), (5, 0));
        assert_eq!(apply_all(&[], 5, 9), (5, 0));
    }

    #[test]
    fn replica_at_shifts_and_records_rank() {
        assert_eq!(apply_all(&[AccessStrategy::ReplicaAt(2)], 1, 4), (3, 2));
    }

    #[test]
    fn wrap_folds_into_slot_range() {
        let strategies = [AccessStrategy::ReplicaAt(2), AccessStrategy::Wrap];
        assert_eq!(apply_all(&strategies, 2, 3), (1, 2));
        // empty ring leaves the index alone
        assert_eq!(apply_all(&[AccessStrategy::Wrap], 7, 0), (7, 0));
    }
}
