use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// Represents a monetary value with 4 decimal places precision.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for payouts and earnings credits.
///
/// Ensures that amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EngineError::validation("amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

// Implement basic arithmetic for Balance to make it a usable Value Object
impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Supplier,
    Admin,
}

/// Accounts are never deleted, only deactivated.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Active,
    Deactivated,
}

/// Derived from the account's submissions: `Verified` once any submission
/// has been verified, `Unverified` otherwise. Rejections never clear it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    Unverified,
    Verified,
}

/// Bank and contact details needed before the first payout request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayoutProfile {
    pub bank_reference: String,
    pub contact_email: String,
}

impl PayoutProfile {
    pub fn new(bank_reference: impl Into<String>, contact_email: impl Into<String>) -> Result<Self> {
        let profile = Self {
            bank_reference: bank_reference.into(),
            contact_email: contact_email.into(),
        };
        let mut violations = Vec::new();
        if profile.bank_reference.trim().is_empty() {
            violations.push("bank_reference must not be empty".to_string());
        }
        if profile.contact_email.trim().is_empty() {
            violations.push("contact_email must not be empty".to_string());
        }
        if violations.is_empty() {
            Ok(profile)
        } else {
            Err(EngineError::Validation { violations })
        }
    }
}

/// A supplier or admin identity.
///
/// Tracks earnings credited by the ledger boundary and the verification
/// status that gates payout eligibility.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub id: Uuid,
    /// Unique human-readable handle, used by reports and scripts.
    pub name: String,
    pub role: Role,
    pub standing: Standing,
    pub verification: Verification,
    /// Absent until the supplier files bank details; required before the
    /// first payout request.
    pub payout_profile: Option<PayoutProfile>,
    /// Running total credited by the external ledger. The engine never
    /// invents earnings on its own.
    pub total_earned: Balance,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, role: Role) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::validation("name must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            role,
            standing: Standing::Active,
            verification: Verification::Unverified,
            payout_profile: None,
            total_earned: Balance::ZERO,
            created_at: Utc::now(),
        })
    }

    pub fn is_verified(&self) -> bool {
        self.verification == Verification::Verified
    }

    pub fn is_active(&self) -> bool {
        self.standing == Standing::Active
    }

    /// Credits earnings reported by the ledger boundary.
    pub fn credit_earnings(&mut self, amount: Amount) {
        self.total_earned += amount.into();
    }

    /// Total earned minus the sum of approved and paid payout amounts.
    ///
    /// `payouts` must be the account's full payout history; the result is
    /// recomputed on every call and never cached, so a decision always sees
    /// the latest committed history.
    pub fn available_balance(&self, payouts: &[crate::domain::payout::PayoutRequest]) -> Balance {
        use crate::domain::payout::PayoutStatus;
        let committed = payouts
            .iter()
            .filter(|p| {
                p.account_id == self.id
                    && matches!(p.status, PayoutStatus::Approved | PayoutStatus::Paid)
            })
            .fold(Balance::ZERO, |acc, p| acc + p.amount.into());
        self.total_earned - committed
    }

    /// Sum of not-yet-decided payout amounts. Outstanding requests reserve
    /// funds until an admin decides them, so concurrent requests cannot
    /// jointly overdraw the account.
    pub fn outstanding_requested(
        &self,
        payouts: &[crate::domain::payout::PayoutRequest],
    ) -> Balance {
        use crate::domain::payout::PayoutStatus;
        payouts
            .iter()
            .filter(|p| p.account_id == self.id && p.status == PayoutStatus::Requested)
            .fold(Balance::ZERO, |acc, p| acc + p.amount.into())
    }

    /// What a new request may draw on: available balance minus outstanding
    /// reservations.
    pub fn spendable_balance(
        &self,
        payouts: &[crate::domain::payout::PayoutRequest],
    ) -> Balance {
        self.available_balance(payouts) - self.outstanding_requested(payouts)
    }

    /// Payout eligibility: active, verified, profile on file, amount covered.
    pub fn can_request_payout(
        &self,
        amount: Amount,
        payouts: &[crate::domain::payout::PayoutRequest],
    ) -> bool {
        self.is_active()
            && self.is_verified()
            && self.payout_profile.is_some()
            && self.spendable_balance(payouts) >= amount.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payout::{PayoutRequest, PayoutStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(EngineError::Validation { .. })
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn test_account_requires_name() {
        assert!(matches!(
            Account::new("  ", Role::Supplier),
            Err(EngineError::Validation { .. })
        ));
        let account = Account::new("acme", Role::Supplier).unwrap();
        assert_eq!(account.standing, Standing::Active);
        assert_eq!(account.verification, Verification::Unverified);
        assert!(account.payout_profile.is_none());
    }

    #[test]
    fn test_payout_profile_lists_all_violations() {
        let err = PayoutProfile::new("", "").unwrap_err();
        match err {
            EngineError::Validation { violations } => assert_eq!(violations.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_credit_earnings() {
        let mut account = Account::new("acme", Role::Supplier).unwrap();
        account.credit_earnings(Amount::new(dec!(100.0)).unwrap());
        account.credit_earnings(Amount::new(dec!(50.0)).unwrap());
        assert_eq!(account.total_earned, Balance::new(dec!(150.0)));
    }

    fn payout(account: &Account, amount: Decimal, status: PayoutStatus) -> PayoutRequest {
        let mut p = PayoutRequest::new(account.id, Amount::new(amount).unwrap()).unwrap();
        p.status = status;
        p
    }

    #[test]
    fn test_available_balance_counts_approved_and_paid_only() {
        let mut account = Account::new("acme", Role::Supplier).unwrap();
        account.credit_earnings(Amount::new(dec!(1000.0)).unwrap());

        let history = vec![
            payout(&account, dec!(100.0), PayoutStatus::Paid),
            payout(&account, dec!(200.0), PayoutStatus::Approved),
            payout(&account, dec!(300.0), PayoutStatus::Rejected),
            payout(&account, dec!(400.0), PayoutStatus::Requested),
        ];

        assert_eq!(account.available_balance(&history), Balance::new(dec!(700.0)));
    }

    #[test]
    fn test_outstanding_requests_reserve_spendable_balance() {
        let mut account = Account::new("acme", Role::Supplier).unwrap();
        account.credit_earnings(Amount::new(dec!(1000.0)).unwrap());

        let history = vec![
            payout(&account, dec!(100.0), PayoutStatus::Paid),
            payout(&account, dec!(400.0), PayoutStatus::Requested),
        ];

        // Reported balance ignores pending requests...
        assert_eq!(account.available_balance(&history), Balance::new(dec!(900.0)));
        // ...but a new request may only draw on what is not yet reserved.
        assert_eq!(account.spendable_balance(&history), Balance::new(dec!(500.0)));
    }

    #[test]
    fn test_can_request_payout_gates() {
        let mut account = Account::new("acme", Role::Supplier).unwrap();
        account.credit_earnings(Amount::new(dec!(100.0)).unwrap());
        let amount = Amount::new(dec!(50.0)).unwrap();

        // Unverified, no profile
        assert!(!account.can_request_payout(amount, &[]));

        account.verification = Verification::Verified;
        assert!(!account.can_request_payout(amount, &[]));

        account.payout_profile = Some(PayoutProfile::new("DE00 1234", "pay@acme.example").unwrap());
        assert!(account.can_request_payout(amount, &[]));

        account.standing = Standing::Deactivated;
        assert!(!account.can_request_payout(amount, &[]));
    }
}
