use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{EnrollmentTerms, PlanConfig};
use crate::decimal::{Grams, Money};
use crate::types::{
    CustomerId, EnrollmentId, EnrollmentStatus, MetalKind, RetailerId, TenantContext, TxnType,
};

/// enrollment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentState {
    // identification
    pub enrollment_id: EnrollmentId,
    pub retailer_id: RetailerId,
    pub customer_id: CustomerId,
    pub plan_id: Uuid,

    // terms copied from the plan at enrollment time
    pub metal_kind: MetalKind,
    pub commitment_amount: Money,
    pub duration_months: u32,
    pub billing_day_of_month: u8,

    // accumulation tracking
    pub grams_accumulated: Grams,
    pub total_paid: Money,
    pub total_primary_paid: Money,

    // payment tracking
    pub payment_count: u32,
    pub top_up_count: u32,
    pub last_payment_amount: Option<Money>,
    pub last_payment_date: Option<DateTime<Utc>>,

    // dates
    pub start_date: DateTime<Utc>,
    pub maturity_date: NaiveDate,
    pub last_status_change: DateTime<Utc>,

    // status
    pub status: EnrollmentStatus,
}

impl EnrollmentState {
    /// create new enrollment state, copying the terms it needs from the plan
    pub fn new(
        enrollment_id: EnrollmentId,
        tenant: &TenantContext,
        plan: &PlanConfig,
        terms: &EnrollmentTerms,
        start_date: DateTime<Utc>,
        maturity_date: NaiveDate,
    ) -> Self {
        Self {
            enrollment_id,
            retailer_id: tenant.retailer_id,
            customer_id: terms.customer_id,
            plan_id: plan.plan_id,
            metal_kind: plan.metal_kind,
            commitment_amount: terms.commitment_amount,
            duration_months: plan.duration_months,
            billing_day_of_month: terms.billing_day_of_month,
            grams_accumulated: Grams::ZERO,
            total_paid: Money::ZERO,
            total_primary_paid: Money::ZERO,
            payment_count: 0,
            top_up_count: 0,
            last_payment_amount: None,
            last_payment_date: None,
            start_date,
            maturity_date,
            last_status_change: start_date,
            status: EnrollmentStatus::Active,
        }
    }

    /// commitment expected over the full term
    pub fn expected_total_commitment(&self) -> Money {
        self.commitment_amount * Decimal::from(self.duration_months)
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// only active enrollments accept payments
    pub fn can_accept_payment(&self) -> bool {
        self.is_active()
    }

    /// update status
    pub fn update_status(&mut self, new_status: EnrollmentStatus, timestamp: DateTime<Utc>) {
        self.status = new_status;
        self.last_status_change = timestamp;
    }

    /// record a successful payment against the running totals
    pub fn record_payment(
        &mut self,
        amount: Money,
        grams: Grams,
        txn_type: TxnType,
        timestamp: DateTime<Utc>,
    ) {
        self.total_paid += amount;
        self.grams_accumulated += grams;
        self.payment_count += 1;
        match txn_type {
            TxnType::PrimaryInstallment => self.total_primary_paid += amount,
            TxnType::TopUp => self.top_up_count += 1,
        }
        self.last_payment_amount = Some(amount);
        self.last_payment_date = Some(timestamp);
    }
}

/// state snapshot for audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub snapshot_id: Uuid,
    pub enrollment_id: EnrollmentId,
    pub timestamp: DateTime<Utc>,
    pub state: EnrollmentState,
    pub trigger: String,
}

impl StateSnapshot {
    pub fn capture(state: &EnrollmentState, trigger: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            enrollment_id: state.enrollment_id,
            timestamp,
            state: state.clone(),
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_state() -> EnrollmentState {
        let tenant = TenantContext::new(Uuid::new_v4(), Uuid::new_v4()).unwrap();
        let plan = PlanConfig::classic_gold(MetalKind::Gold22K, Money::from_major(1_000));
        let terms = EnrollmentTerms::new(Uuid::new_v4(), Money::from_major(5_000), 5);

        EnrollmentState::new(
            Uuid::new_v4(),
            &tenant,
            &plan,
            &terms,
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
        )
    }

    #[test]
    fn test_expected_total_commitment() {
        let state = sample_state();
        assert_eq!(state.expected_total_commitment(), Money::from_major(55_000));
    }

    #[test]
    fn test_record_payment_totals() {
        let mut state = sample_state();
        let ts = Utc.with_ymd_and_hms(2024, 1, 12, 10, 0, 0).unwrap();

        state.record_payment(
            Money::from_major(5_000),
            Grams::allocate(Money::from_major(5_000), Money::from_major(6_000)),
            TxnType::PrimaryInstallment,
            ts,
        );
        state.record_payment(
            Money::from_major(1_200),
            Grams::allocate(Money::from_major(1_200), Money::from_major(6_000)),
            TxnType::TopUp,
            ts,
        );

        assert_eq!(state.total_paid, Money::from_major(6_200));
        assert_eq!(state.total_primary_paid, Money::from_major(5_000));
        assert_eq!(state.payment_count, 2);
        assert_eq!(state.top_up_count, 1);
        assert_eq!(state.last_payment_amount, Some(Money::from_major(1_200)));
    }

    #[test]
    fn test_state_json_round_trip() {
        let state = sample_state();

        let json = serde_json::to_string(&state).unwrap();
        let restored: EnrollmentState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
    }

    #[test]
    fn test_snapshot_captures_trigger() {
        let state = sample_state();
        let ts = Utc.with_ymd_and_hms(2024, 1, 12, 10, 0, 0).unwrap();

        let snapshot = StateSnapshot::capture(&state, "enrollment".to_string(), ts);
        assert_eq!(snapshot.enrollment_id, state.enrollment_id);
        assert_eq!(snapshot.state, state);
        assert_eq!(snapshot.trigger, "enrollment");
    }
}
