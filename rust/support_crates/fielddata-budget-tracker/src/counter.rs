use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe counter that enables multiple consumers to withdraw (if possible) and deposit
/// specific amounts, ensuring that the counter value remains non-negative.
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new(amount: u64) -> Counter {
        Counter(AtomicU64::new(amount))
    }

    /// Attempts to withdraw the specified `amount` from the counter.
    ///
    /// Returns `false` and leaves the counter unchanged when the current value is
    /// less than `amount`.
    pub fn withdraw(&self, amount: u64) -> bool {
        let mut current = self.0.load(Ordering::Relaxed);
        while current >= amount {
            match self.0.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
        false
    }

    pub fn deposit(&self, amount: u64) {
        self.0.fetch_add(amount, Ordering::Release);
    }

    /// Returns the counter value (most likely stale by the time it is observed by the caller).
    pub fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_withdraw_and_deposit() {
        let counter = Counter::new(100);
        assert!(counter.withdraw(60));
        assert!(!counter.withdraw(50));
        assert_eq!(counter.read(), 40);
        counter.deposit(10);
        assert_eq!(counter.read(), 50);
        assert!(counter.withdraw(50));
        assert_eq!(counter.read(), 0);
    }

    #[test]
    fn test_concurrent_withdrawals_never_overdraw() {
        let counter = Arc::new(Counter::new(1000));
        let handles = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || (0..200).filter(|_| counter.withdraw(1)).count())
            })
            .collect::<Vec<_>>();
        let withdrawn: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(withdrawn, 1000);
        assert_eq!(counter.read(), 0);
    }
}
