pub mod ledger;
pub mod schedule;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{BillingStatus, EnrollmentId};

pub use ledger::{CommitmentLedger, MonthlyStatus};
pub use schedule::BillingSchedule;

/// one billing month of an enrollment.
///
/// At most one row exists per (enrollment, month); opening the same month
/// twice returns the existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingMonth {
    pub id: Uuid,
    pub enrollment_id: EnrollmentId,
    /// first calendar day of the month this commitment applies to
    pub month: NaiveDate,
    /// date the primary installment falls due, clamped to month length
    pub due_date: NaiveDate,
    pub primary_paid: bool,
    pub status: BillingStatus,
}

impl BillingMonth {
    pub fn open(enrollment_id: EnrollmentId, month: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            enrollment_id,
            month,
            due_date,
            primary_paid: false,
            status: BillingStatus::Due,
        }
    }

    /// mark the month's commitment satisfied
    pub fn mark_paid(&mut self) {
        self.primary_paid = true;
        self.status = BillingStatus::Paid;
    }

    /// mark the month missed once its due date has passed unpaid
    pub fn mark_missed(&mut self) {
        self.status = BillingStatus::Missed;
    }
}
