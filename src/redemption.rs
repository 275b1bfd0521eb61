use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Grams, Money};
use crate::errors::{Result, SchemeError};
use crate::state::EnrollmentState;
use crate::types::{CustomerId, EnrollmentId, MetalKind, RedemptionStatus};

/// terminal conversion of accumulated grams, one per enrollment.
///
/// Valued at the rate current at processing time, not the locked historical
/// snapshots. Payments lock their rate; redemptions do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub enrollment_id: EnrollmentId,
    pub customer_id: CustomerId,
    pub metal_kind: MetalKind,
    pub grams_redeemed: Grams,
    pub rate_per_gram: Money,
    pub total_value: Money,
    pub status: RedemptionStatus,
    pub processed_by: Uuid,
    pub processed_at: DateTime<Utc>,
}

/// result of checking the three redemption conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    /// today is on or past the maturity date
    pub matured: bool,
    /// some grams were accumulated
    pub has_grams: bool,
    /// lifetime primary total covers commitment x duration, every month
    /// eventually made whole
    pub fully_funded: bool,
    pub maturity_date: NaiveDate,
    pub expected_commitment: Money,
    pub lifetime_primary_paid: Money,
}

impl EligibilityReport {
    /// evaluate an enrollment's redemption conditions as of `today`
    pub fn evaluate(
        state: &EnrollmentState,
        lifetime_primary_paid: Money,
        today: NaiveDate,
    ) -> Self {
        let expected = state.expected_total_commitment();
        Self {
            matured: today >= state.maturity_date,
            has_grams: state.grams_accumulated.is_positive(),
            fully_funded: lifetime_primary_paid >= expected,
            maturity_date: state.maturity_date,
            expected_commitment: expected,
            lifetime_primary_paid,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.matured && self.has_grams && self.fully_funded
    }

    /// the date eligibility began, once the funding conditions hold
    pub fn eligible_since(&self) -> Option<NaiveDate> {
        if self.has_grams && self.fully_funded {
            Some(self.maturity_date)
        } else {
            None
        }
    }

    /// surface the first failed condition as a structured error
    pub fn ensure_eligible(&self, today: NaiveDate) -> Result<()> {
        if !self.matured {
            return Err(SchemeError::NotYetMatured {
                maturity_date: self.maturity_date,
                current_date: today,
            });
        }
        if !self.has_grams {
            return Err(SchemeError::NothingAccumulated);
        }
        if !self.fully_funded {
            return Err(SchemeError::CommitmentShortfall {
                expected: self.expected_commitment,
                paid: self.lifetime_primary_paid,
            });
        }
        Ok(())
    }
}
