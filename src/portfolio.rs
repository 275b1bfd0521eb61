use std::collections::HashMap;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{EnrollmentTerms, PlanConfig};
use crate::decimal::Money;
use crate::enrollment::Enrollment;
use crate::errors::{Result, SchemeError};
use crate::payments::Transaction;
use crate::rates::{RateBook, RateEntry};
use crate::redemption::Redemption;
use crate::types::{CustomerId, EnrollmentId, MetalKind, PaymentMode, PaymentSource, TenantContext};

/// a retailer's customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
}

/// one retailer's book: customers, published rates, and enrollments.
///
/// Routes operations by id so callers get "record not found" failures for
/// dangling references instead of silently creating orphans.
pub struct Portfolio {
    pub tenant: TenantContext,
    rates: RateBook,
    customers: HashMap<CustomerId, Customer>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
}

impl Portfolio {
    pub fn new(tenant: TenantContext) -> Self {
        Self {
            tenant,
            rates: RateBook::new(),
            customers: HashMap::new(),
            enrollments: HashMap::new(),
        }
    }

    /// register a customer
    pub fn add_customer(&mut self, name: String, phone: Option<String>) -> CustomerId {
        let customer = Customer {
            id: Uuid::new_v4(),
            name,
            phone,
        };
        let id = customer.id;
        self.customers.insert(id, customer);
        id
    }

    pub fn customer(&self, id: CustomerId) -> Result<&Customer> {
        self.customers
            .get(&id)
            .ok_or(SchemeError::CustomerNotFound { id })
    }

    /// publish a rate on the retailer's dashboard
    pub fn record_rate(
        &mut self,
        metal_kind: MetalKind,
        price_per_gram: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<RateEntry> {
        self.rates.record(metal_kind, price_per_gram, time_provider)
    }

    pub fn rates(&self) -> &RateBook {
        &self.rates
    }

    /// enroll a registered customer into a plan
    pub fn enroll(
        &mut self,
        plan: PlanConfig,
        terms: EnrollmentTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<EnrollmentId> {
        self.customer(terms.customer_id)?;

        let enrollment = Enrollment::open(self.tenant, plan, terms, time_provider)?;
        let id = enrollment.id;
        self.enrollments.insert(id, enrollment);
        Ok(id)
    }

    pub fn enrollment(&self, id: EnrollmentId) -> Result<&Enrollment> {
        self.enrollments
            .get(&id)
            .ok_or(SchemeError::EnrollmentNotFound { id })
    }

    pub fn enrollment_mut(&mut self, id: EnrollmentId) -> Result<&mut Enrollment> {
        self.enrollments
            .get_mut(&id)
            .ok_or(SchemeError::EnrollmentNotFound { id })
    }

    /// all enrollments belonging to a customer
    pub fn enrollments_for(&self, customer_id: CustomerId) -> Vec<&Enrollment> {
        self.enrollments
            .values()
            .filter(|e| e.state.customer_id == customer_id)
            .collect()
    }

    /// record a payment against an enrollment at the current rate
    pub fn record_payment(
        &mut self,
        enrollment_id: EnrollmentId,
        amount: Money,
        mode: PaymentMode,
        source: PaymentSource,
        time_provider: &SafeTimeProvider,
    ) -> Result<Transaction> {
        let enrollment = self
            .enrollments
            .get_mut(&enrollment_id)
            .ok_or(SchemeError::EnrollmentNotFound { id: enrollment_id })?;

        enrollment
            .record_payment(amount, mode, source, &self.rates, time_provider)
            .cloned()
    }

    /// monthly rollover across the book: one billing row per active
    /// enrollment per month, overdue unpaid months marked missed
    pub fn advance_billing(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        for enrollment in self.enrollments.values_mut() {
            enrollment.advance_billing(time_provider)?;
        }
        Ok(())
    }

    /// redeem a matured enrollment at the current rate
    pub fn process_redemption(
        &mut self,
        enrollment_id: EnrollmentId,
        processed_by: Uuid,
        time_provider: &SafeTimeProvider,
    ) -> Result<Redemption> {
        let enrollment = self
            .enrollments
            .get_mut(&enrollment_id)
            .ok_or(SchemeError::EnrollmentNotFound { id: enrollment_id })?;

        enrollment.process_redemption(processed_by, &self.rates, time_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BillingStatus, EnrollmentStatus};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn test_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        ))
    }

    fn portfolio() -> Portfolio {
        let tenant = TenantContext::new(Uuid::new_v4(), Uuid::new_v4()).unwrap();
        Portfolio::new(tenant)
    }

    #[test]
    fn test_unknown_customer_cannot_enroll() {
        let time = test_clock();
        let mut book = portfolio();

        let plan = PlanConfig::classic_gold(MetalKind::Gold22K, Money::from_major(1_000));
        let terms = EnrollmentTerms::new(Uuid::new_v4(), Money::from_major(5_000), 5);

        assert!(matches!(
            book.enroll(plan, terms, &time),
            Err(SchemeError::CustomerNotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_enrollment_rejected() {
        let time = test_clock();
        let mut book = portfolio();
        let missing = Uuid::new_v4();

        let err = book.record_payment(
            missing,
            Money::from_major(5_000),
            PaymentMode::Upi,
            PaymentSource::AdminDashboard,
            &time,
        );
        assert!(matches!(
            err,
            Err(SchemeError::EnrollmentNotFound { id }) if id == missing
        ));
        assert!(book.enrollment(missing).is_err());
    }

    #[test]
    fn test_payment_routes_through_book() {
        let time = test_clock();
        let mut book = portfolio();

        book.record_rate(MetalKind::Gold22K, Money::from_major(6_000), &time)
            .unwrap();
        let customer_id = book.add_customer("Asha".to_string(), None);
        let plan = PlanConfig::classic_gold(MetalKind::Gold22K, Money::from_major(1_000));
        let terms = EnrollmentTerms::new(customer_id, Money::from_major(5_000), 5);
        let enrollment_id = book.enroll(plan, terms, &time).unwrap();

        let txn = book
            .record_payment(
                enrollment_id,
                Money::from_major(5_000),
                PaymentMode::Upi,
                PaymentSource::CustomerPortal,
                &time,
            )
            .unwrap();
        assert_eq!(txn.rate_per_gram, Money::from_major(6_000));

        let enrollment = book.enrollment(enrollment_id).unwrap();
        assert!(enrollment.current_monthly_status(&time).is_met);
        assert_eq!(book.enrollments_for(customer_id).len(), 1);
    }

    #[test]
    fn test_payment_blocked_without_rate() {
        let time = test_clock();
        let mut book = portfolio();

        let customer_id = book.add_customer("Ravi".to_string(), None);
        let plan = PlanConfig::silver_monthly(Money::from_major(500), 12);
        let terms = EnrollmentTerms::new(customer_id, Money::from_major(500), 10);
        let enrollment_id = book.enroll(plan, terms, &time).unwrap();

        // no silver rate published yet
        let err = book.record_payment(
            enrollment_id,
            Money::from_major(500),
            PaymentMode::Cash,
            PaymentSource::AdminDashboard,
            &time,
        );
        assert!(matches!(
            err,
            Err(SchemeError::RateUnavailable {
                metal_kind: MetalKind::Silver
            })
        ));
    }

    #[test]
    fn test_rollover_covers_active_enrollments_only() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let mut book = portfolio();

        book.record_rate(MetalKind::Gold22K, Money::from_major(6_000), &time)
            .unwrap();
        let customer_id = book.add_customer("Meena".to_string(), None);
        let plan = PlanConfig::classic_gold(MetalKind::Gold22K, Money::from_major(1_000));

        let active = book
            .enroll(
                plan.clone(),
                EnrollmentTerms::new(customer_id, Money::from_major(5_000), 5),
                &time,
            )
            .unwrap();
        let cancelled = book
            .enroll(
                plan,
                EnrollmentTerms::new(customer_id, Money::from_major(2_000), 5),
                &time,
            )
            .unwrap();
        book.enrollment_mut(cancelled)
            .unwrap()
            .cancel("switched plans".to_string(), &time)
            .unwrap();

        control.advance(Duration::days(40)); // feb 19, past the feb 5 due date
        book.advance_billing(&time).unwrap();

        let rows = &book.enrollment(active).unwrap().billing_months;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, BillingStatus::Missed);

        // the cancelled enrollment got no new rows
        let cancelled = book.enrollment(cancelled).unwrap();
        assert_eq!(cancelled.state.status, EnrollmentStatus::Cancelled);
        assert_eq!(cancelled.billing_months.len(), 1);
    }
}
