//! Memory budget shared by concurrent field data builds.
//!
//! A [`Budget`] is a limit on the number of bytes that transient build structures may
//! hold at once. Builders take [`Allocation`]s from it; an allocation returns its bytes
//! to the budget when dropped, on every exit path of the build.

use std::sync::Arc;

use counter::Counter;

pub mod counter;

/// Represents a budget that can be allocated from.
#[derive(Clone)]
pub struct Budget(Arc<BudgetNode>);

impl Budget {
    /// Creates a new budget with the given amount.
    pub fn new(amount: u64) -> Budget {
        Budget(Arc::new(BudgetNode {
            limit: amount,
            remaining: Counter::new(amount),
        }))
    }

    /// The amount this budget was created with.
    pub fn limit(&self) -> u64 {
        self.0.limit
    }

    /// Returns the remaining amount in this budget.
    ///
    /// **Note**: This method is primarily intended for diagnostic purposes. The returned
    /// value may be outdated in a concurrent environment.
    pub fn remaining(&self) -> u64 {
        self.0.remaining.read()
    }

    /// Amount currently held by live allocations (and their reservations).
    pub fn used(&self) -> u64 {
        self.0.limit - self.remaining()
    }

    /// Attempts to allocate the specified amount from the budget.
    ///
    /// The allocated amount is automatically returned to the `Budget` when the
    /// `Allocation` is dropped.
    pub fn allocate(&self, amount: u64) -> Result<Allocation, AllocationError> {
        if self.0.remaining.withdraw(amount) {
            Ok(Allocation {
                budget: self.0.clone(),
                amount,
                reservation: 0,
                reservation_slice: 0,
            })
        } else {
            Err(AllocationError {
                requested: amount,
                remaining: self.remaining(),
            })
        }
    }
}

impl std::fmt::Debug for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Budget")
            .field("limit", &self.limit())
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// Represents an allocation from a budget.
///
/// Tracks the amount that has been allocated and allows for its adjustment as needed.
/// When the allocation is dropped, the allocated amount is returned to the budget.
pub struct Allocation {
    budget: Arc<BudgetNode>,
    amount: u64,
    reservation: u64,
    reservation_slice: u64,
}

impl Allocation {
    /// Currently allocated amount.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Currently reserved amount (on top of the allocated one).
    ///
    /// Calling `grow(n)` where `n <= reservation` will always succeed.
    pub fn reservation(&self) -> u64 {
        self.reservation
    }

    /// Amount taken from the budget by this allocation.
    pub fn capacity(&self) -> u64 {
        self.amount + self.reservation
    }

    /// Grows the allocation by the given amount.
    ///
    /// When the reservation is insufficient, at least `reservation_slice` bytes are
    /// reserved from the budget in one step.
    pub fn grow(&mut self, additional: u64) -> Result<(), AllocationError> {
        if additional > self.reservation {
            self.reserve(additional.max(self.reservation_slice))?;
        }

        assert!(additional <= self.reservation);
        self.reservation -= additional;
        self.amount += additional;
        Ok(())
    }

    /// Reserves the specified amount for subsequent allocations.
    fn reserve(&mut self, reservation: u64) -> Result<(), AllocationError> {
        if reservation <= self.reservation {
            return Ok(());
        }
        let to_allocate = reservation - self.reservation;
        if self.budget.remaining.withdraw(to_allocate) {
            self.reservation = reservation;
            Ok(())
        } else {
            Err(AllocationError {
                requested: to_allocate,
                remaining: self.budget.remaining.read(),
            })
        }
    }

    pub fn set_reservation_slice(&mut self, reservation_slice: u64) {
        self.reservation_slice = reservation_slice;
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        let to_release = self.capacity();
        if to_release != 0 {
            self.budget.remaining.deposit(to_release);
        }
    }
}

impl std::fmt::Debug for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocation")
            .field("amount", &self.amount)
            .field("reservation", &self.reservation)
            .finish_non_exhaustive()
    }
}

/// An error that occurs when a budget allocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocationError {
    /// Amount that could not be withdrawn.
    pub requested: u64,
    /// Remaining budget observed at the time of the failure.
    pub remaining: u64,
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Budget allocation error: requested {}, remaining {}",
            self.requested, self.remaining
        )
    }
}

impl std::error::Error for AllocationError {}

struct BudgetNode {
    limit: u64,
    remaining: Counter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_creation() {
        let budget = Budget::new(100);
        assert_eq!(budget.remaining(), 100);
        assert_eq!(budget.used(), 0);
        assert_eq!(budget.limit(), 100);
    }

    #[test]
    fn test_allocate_success() {
        let budget = Budget::new(100);
        let allocation = budget.allocate(50).unwrap();
        assert_eq!(allocation.amount(), 50);
        assert_eq!(budget.remaining(), 50);
        assert_eq!(budget.used(), 50);
    }

    #[test]
    fn test_allocate_failure() {
        let budget = Budget::new(100);
        let err = budget.allocate(150).unwrap_err();
        assert_eq!(
            err,
            AllocationError {
                requested: 150,
                remaining: 100
            }
        );
        assert_eq!(budget.remaining(), 100);
    }

    #[test]
    fn test_allocation_drop() {
        let budget = Budget::new(100);
        {
            let mut allocation = budget.allocate(50).unwrap();
            allocation.grow(20).unwrap();
        }
        assert_eq!(budget.remaining(), 100);
    }

    #[test]
    fn test_allocation_grow_failure() {
        let budget = Budget::new(100);
        let mut allocation = budget.allocate(50).unwrap();
        assert!(allocation.grow(60).is_err());
        assert_eq!(allocation.amount(), 50);
        assert_eq!(budget.remaining(), 50);
    }

    #[test]
    fn test_allocation_grow_with_reservation_slice() {
        let budget = Budget::new(100);
        let mut allocation = budget.allocate(10).unwrap();
        allocation.set_reservation_slice(30);
        allocation.grow(5).unwrap();
        assert_eq!(allocation.amount(), 15);
        assert_eq!(allocation.reservation(), 25);
        assert_eq!(budget.remaining(), 60);

        // Served from the reservation, the budget is not touched.
        allocation.grow(20).unwrap();
        assert_eq!(allocation.reservation(), 5);
        assert_eq!(budget.remaining(), 60);
    }
}
