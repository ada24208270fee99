//! Credit ledger: the session-local mirror of a persisted balance
//!
//! Three writers touch the mirrored value and the last one wins: a spend,
//! an explicit refresh, and the realtime credit feed. Spends against the
//! persisted store are a single conditional decrement so that two rapid
//! spends can never both succeed against a stale balance; the decremented
//! row returns the authoritative post-balance, which replaces the mirror.
//! Demo sessions have no persisted row and use the serialized local path.

use sqlx::PgPool;

use crate::constants::DEMO_ID_PREFIX;
use crate::domain::profiles;

/// Session-local mirror of `profiles.credits` for one user
#[derive(Debug)]
pub struct CreditLedger {
    user_id: String,
    balance: i64,
}

/// Spend precondition failure. Carries what the caller needs for the
/// insufficient-funds alert and the buy-credits redirect.
#[derive(Debug, PartialEq, Eq)]
pub struct InsufficientCredits {
    pub balance: i64,
    pub required: i64,
}

impl std::fmt::Display for InsufficientCredits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient credits: balance {} < required {}",
            self.balance, self.required
        )
    }
}

#[derive(Debug)]
pub enum SpendError {
    Insufficient(InsufficientCredits),
    Database(sqlx::Error),
}

impl std::fmt::Display for SpendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpendError::Insufficient(e) => write!(f, "{}", e),
            SpendError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl CreditLedger {
    pub fn new(user_id: impl Into<String>, balance: i64) -> Self {
        Self {
            user_id: user_id.into(),
            balance,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current mirrored balance
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Demo ledgers never sync remotely
    pub fn is_demo(&self) -> bool {
        self.user_id.starts_with(DEMO_ID_PREFIX)
    }

    /// Overwrite the mirror with a remotely observed balance.
    /// Last write wins; there is no merge.
    pub fn apply_remote(&mut self, balance: i64) {
        self.balance = balance;
    }

    /// Check-then-decrement against the local mirror only. Used for demo
    /// sessions, where the mirror is the authoritative value.
    pub fn try_spend_local(&mut self, cost: i64) -> Result<i64, InsufficientCredits> {
        if self.balance < cost {
            return Err(InsufficientCredits {
                balance: self.balance,
                required: cost,
            });
        }
        self.balance -= cost;
        Ok(self.balance)
    }
}

/// Spend credits, routing to the store for persisted users.
///
/// For non-demo users this is a conditional decrement on the `profiles` row;
/// a rejected decrement means the authoritative balance was too low even if
/// the mirror claimed otherwise, so the mirror is re-read before reporting
/// the failure. Returns the new balance on success.
pub async fn spend(db: &PgPool, ledger: &mut CreditLedger, cost: i64) -> Result<i64, SpendError> {
    if ledger.is_demo() {
        return ledger
            .try_spend_local(cost)
            .map_err(SpendError::Insufficient);
    }

    match profiles::try_spend_credits(db, ledger.user_id(), cost)
        .await
        .map_err(SpendError::Database)?
    {
        Some(post_balance) => {
            ledger.apply_remote(post_balance);
            Ok(post_balance)
        }
        None => {
            // Bring the stale mirror back in line with the store
            if let Ok(Some(actual)) = profiles::fetch_credits(db, ledger.user_id()).await {
                ledger.apply_remote(actual);
            }
            Err(SpendError::Insufficient(InsufficientCredits {
                balance: ledger.balance(),
                required: cost,
            }))
        }
    }
}

/// Re-fetch the authoritative balance and overwrite the mirror.
/// No-op for demo users. Returns the balance the caller should display.
pub async fn refresh(db: &PgPool, ledger: &mut CreditLedger) -> Result<i64, sqlx::Error> {
    if ledger.is_demo() {
        return Ok(ledger.balance());
    }
    if let Some(credits) = profiles::fetch_credits(db, ledger.user_id()).await? {
        ledger.apply_remote(credits);
    }
    Ok(ledger.balance())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_spends_sum() {
        let mut ledger = CreditLedger::new("mock-eunice", 100);
        ledger.try_spend_local(30).expect("first spend");
        ledger.try_spend_local(45).expect("second spend");
        assert_eq!(ledger.balance(), 25);
    }

    #[test]
    fn test_overspend_leaves_balance_unchanged() {
        let mut ledger = CreditLedger::new("mock-eunice", 5);
        let err = ledger.try_spend_local(10).expect_err("must fail");
        assert_eq!(
            err,
            InsufficientCredits {
                balance: 5,
                required: 10
            }
        );
        assert_eq!(ledger.balance(), 5);
    }

    #[test]
    fn test_rapid_double_spend_cannot_go_negative() {
        // Spends are serialized against the running balance, so the second
        // of two rapid 60-credit spends on a balance of 100 is rejected
        // instead of both succeeding against the same stale snapshot.
        let mut ledger = CreditLedger::new("mock-eunice", 100);
        assert_eq!(ledger.try_spend_local(60), Ok(40));
        assert!(ledger.try_spend_local(60).is_err());
        assert_eq!(ledger.balance(), 40);
    }

    #[test]
    fn test_remote_update_overwrites_optimistic_value() {
        let mut ledger = CreditLedger::new("8f2c1c9a", 100);
        ledger.try_spend_local(60).expect("spend");
        assert_eq!(ledger.balance(), 40);
        // A push event always wins over the local value, no merge
        ledger.apply_remote(75);
        assert_eq!(ledger.balance(), 75);
    }

    #[test]
    fn test_spend_to_exactly_zero() {
        let mut ledger = CreditLedger::new("mock-osmar", 10);
        assert_eq!(ledger.try_spend_local(10), Ok(0));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_demo_detection() {
        assert!(CreditLedger::new("mock-nice", 0).is_demo());
        assert!(!CreditLedger::new("8f2c1c9a", 0).is_demo());
    }
}
