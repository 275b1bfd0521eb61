use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, SchemeError};
use crate::types::{CustomerId, MetalKind};

/// savings plan template.
///
/// Read-only once published: enrollments copy the terms they need at
/// creation time and never read the plan again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub plan_id: Uuid,
    pub name: String,
    pub metal_kind: MetalKind,
    pub duration_months: u32,
    pub min_installment: Money,
    pub allow_top_up: bool,
}

impl PlanConfig {
    /// classic 11-month gold scheme
    pub fn classic_gold(karat: MetalKind, min_installment: Money) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            name: format!("Classic Gold {}", karat),
            metal_kind: karat,
            duration_months: 11,
            min_installment,
            allow_top_up: true,
        }
    }

    /// monthly silver scheme with a configurable term
    pub fn silver_monthly(min_installment: Money, duration_months: u32) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            name: "Silver Monthly".to_string(),
            metal_kind: MetalKind::Silver,
            duration_months,
            min_installment,
            allow_top_up: false,
        }
    }

    /// validate plan terms
    pub fn validate(&self) -> Result<()> {
        if self.duration_months == 0 {
            return Err(SchemeError::InvalidConfiguration {
                message: "plan duration must be at least one month".to_string(),
            });
        }
        if !self.min_installment.is_positive() {
            return Err(SchemeError::InvalidConfiguration {
                message: format!("plan minimum installment must be positive, got {}", self.min_installment),
            });
        }
        Ok(())
    }
}

/// per-customer enrollment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentTerms {
    pub customer_id: CustomerId,
    /// monthly amount the customer commits to; may exceed the plan minimum
    pub commitment_amount: Money,
    /// day of month the installment falls due, clamped to month length
    pub billing_day_of_month: u8,
}

impl EnrollmentTerms {
    pub fn new(customer_id: CustomerId, commitment_amount: Money, billing_day_of_month: u8) -> Self {
        Self {
            customer_id,
            commitment_amount,
            billing_day_of_month,
        }
    }

    /// validate terms against the plan they enroll into
    pub fn validate(&self, plan: &PlanConfig) -> Result<()> {
        plan.validate()?;

        if self.billing_day_of_month < 1 || self.billing_day_of_month > 31 {
            return Err(SchemeError::InvalidBillingDay {
                day: self.billing_day_of_month,
            });
        }
        if self.commitment_amount < plan.min_installment {
            return Err(SchemeError::CommitmentBelowMinimum {
                minimum: plan.min_installment,
                provided: self.commitment_amount,
            });
        }
        Ok(())
    }
}
