use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Grams, Money};
use crate::payments::Transaction;

/// reconciliation of one billing month against the commitment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatus {
    /// first calendar day of the month
    pub month: NaiveDate,
    pub commitment_amount: Money,
    pub total_paid: Money,
    pub remaining: Money,
    pub is_met: bool,
}

/// computes commitment satisfaction from recorded transactions.
///
/// Read-only: every query recomputes from the transaction list, there is no
/// cached "is met" flag to invalidate. Only successful primary installments
/// count toward a month's commitment; top-ups buy grams but never satisfy
/// it.
#[derive(Debug, Clone, Copy)]
pub struct CommitmentLedger {
    commitment_amount: Money,
}

impl CommitmentLedger {
    pub fn new(commitment_amount: Money) -> Self {
        Self { commitment_amount }
    }

    /// commitment status for the calendar month containing `month`
    pub fn monthly_status(&self, transactions: &[Transaction], month: NaiveDate) -> MonthlyStatus {
        let total_paid = transactions
            .iter()
            .filter(|t| t.is_successful() && t.is_primary())
            .filter(|t| in_month(t.paid_at.date_naive(), month))
            .fold(Money::ZERO, |sum, t| sum + t.amount_paid);

        let remaining = self.commitment_amount.saturating_sub(total_paid);

        MonthlyStatus {
            month: first_of_month(month),
            commitment_amount: self.commitment_amount,
            total_paid,
            remaining,
            is_met: total_paid >= self.commitment_amount,
        }
    }

    /// cumulative successful primary installments over the enrollment's life
    pub fn lifetime_primary_paid(&self, transactions: &[Transaction]) -> Money {
        transactions
            .iter()
            .filter(|t| t.is_successful() && t.is_primary())
            .fold(Money::ZERO, |sum, t| sum + t.amount_paid)
    }

    /// cumulative grams across all successful payments, top-ups included
    pub fn lifetime_grams(&self, transactions: &[Transaction]) -> Grams {
        transactions
            .iter()
            .filter(|t| t.is_successful())
            .fold(Grams::ZERO, |sum, t| sum + t.grams_allocated)
    }
}

fn in_month(date: NaiveDate, month: NaiveDate) -> bool {
    date.year() == month.year() && date.month() == month.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMode, PaymentSource, PaymentStatus, TxnType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn txn(amount: i64, txn_type: TxnType, status: PaymentStatus, day: u32) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            enrollment_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            amount_paid: Money::from_major(amount),
            rate_per_gram: Money::from_major(6_000),
            grams_allocated: Grams::allocate(Money::from_major(amount), Money::from_major(6_000)),
            txn_type,
            payment_status: status,
            paid_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            mode: PaymentMode::Upi,
            source: PaymentSource::AdminDashboard,
            reference: String::new(),
        }
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_commitment_monotonicity() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));

        // two primaries summing to the commitment, recorded out of order
        let txns = vec![
            txn(3_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 20),
            txn(2_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 5),
        ];

        let status = ledger.monthly_status(&txns, march());
        assert_eq!(status.total_paid, Money::from_major(5_000));
        assert_eq!(status.remaining, Money::ZERO);
        assert!(status.is_met);
    }

    #[test]
    fn test_partial_month_not_met() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));
        let txns = vec![txn(2_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 5)];

        let status = ledger.monthly_status(&txns, march());
        assert_eq!(status.total_paid, Money::from_major(2_000));
        assert_eq!(status.remaining, Money::from_major(3_000));
        assert!(!status.is_met);
    }

    #[test]
    fn test_top_up_excluded() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));
        let txns = vec![
            txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 5),
            txn(10_000, TxnType::TopUp, PaymentStatus::Success, 10),
        ];

        let status = ledger.monthly_status(&txns, march());
        // the top-up changes neither total_paid nor is_met
        assert_eq!(status.total_paid, Money::from_major(5_000));
        assert!(status.is_met);

        let only_top_up = vec![txn(10_000, TxnType::TopUp, PaymentStatus::Success, 10)];
        let status = ledger.monthly_status(&only_top_up, march());
        assert_eq!(status.total_paid, Money::ZERO);
        assert!(!status.is_met);
    }

    #[test]
    fn test_unsuccessful_payments_excluded() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));
        let txns = vec![
            txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Pending, 5),
            txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Failed, 6),
        ];

        let status = ledger.monthly_status(&txns, march());
        assert_eq!(status.total_paid, Money::ZERO);
        assert!(!status.is_met);
    }

    #[test]
    fn test_other_months_excluded() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));
        let txns = vec![txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 5)];

        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let status = ledger.monthly_status(&txns, april);
        assert_eq!(status.total_paid, Money::ZERO);
    }

    #[test]
    fn test_lifetime_totals() {
        let ledger = CommitmentLedger::new(Money::from_major(5_000));
        let txns = vec![
            txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Success, 5),
            txn(3_000, TxnType::TopUp, PaymentStatus::Success, 10),
            txn(5_000, TxnType::PrimaryInstallment, PaymentStatus::Failed, 12),
        ];

        // primary total excludes top-ups and failures
        assert_eq!(
            ledger.lifetime_primary_paid(&txns),
            Money::from_major(5_000)
        );

        // grams accumulate from every successful purchase, top-ups included
        let expected = Grams::allocate(Money::from_major(8_000), Money::from_major(6_000));
        assert_eq!(
            ledger.lifetime_grams(&txns).round_dp(8),
            expected.round_dp(8)
        );
    }
}
