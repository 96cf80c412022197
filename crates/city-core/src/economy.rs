//! Treasury collaborator.
//!
//! The tax/resource ledger lives outside the core. Missions only need to ask
//! whether a cost is affordable and then debit it.

/// The slice of the economy the core is allowed to touch.
pub trait Treasury {
    fn balance(&self) -> f64;

    /// Debits `amount`. Callers check [`Treasury::can_afford`] first.
    fn spend(&mut self, amount: f64);

    fn can_afford(&self, cost: f64) -> bool {
        self.balance() >= cost
    }
}

/// Minimal in-memory treasury used by the headless driver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coffers {
    balance: f64,
}

impl Coffers {
    pub fn new(balance: f64) -> Self {
        Self { balance }
    }

    /// Credits (or, if negative, debits) `amount`.
    pub fn deposit(&mut self, amount: f64) {
        if amount.is_finite() {
            self.balance += amount;
        }
    }
}

impl Treasury for Coffers {
    fn balance(&self) -> f64 {
        self.balance
    }

    fn spend(&mut self, amount: f64) {
        if amount.is_finite() {
            self.balance -= amount;
        }
    }
}
