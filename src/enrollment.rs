use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::billing::{BillingMonth, BillingSchedule, CommitmentLedger, MonthlyStatus};
use crate::config::{EnrollmentTerms, PlanConfig};
use crate::decimal::Money;
use crate::errors::{Result, SchemeError};
use crate::events::{Event, EventStore};
use crate::payments::{PaymentAllocator, Transaction};
use crate::rates::RateBook;
use crate::redemption::{EligibilityReport, Redemption};
use crate::state::{EnrollmentState, StateSnapshot};
use crate::types::{
    BillingStatus, EnrollmentId, EnrollmentStatus, PaymentMode, PaymentSource, PaymentStatus,
    RedemptionStatus, TenantContext,
};

/// one customer's enrollment into a savings plan.
///
/// Every payment-recording call site routes through this aggregate, so the
/// commitment arithmetic exists exactly once. Classification and insert
/// happen inside one `&mut self` call, so a month's commitment, once met,
/// cannot be re-met: the next payment that month classifies as a top-up.
pub struct Enrollment {
    pub id: EnrollmentId,
    pub tenant: TenantContext,
    pub plan: PlanConfig,
    pub schedule: BillingSchedule,
    pub state: EnrollmentState,
    pub billing_months: Vec<BillingMonth>,
    pub transactions: Vec<Transaction>,
    pub redemption: Option<Redemption>,
    pub events: EventStore,
    pub snapshots: Vec<StateSnapshot>,
}

impl Enrollment {
    /// enroll a customer into a plan
    pub fn open(
        tenant: TenantContext,
        plan: PlanConfig,
        terms: EnrollmentTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        terms.validate(&plan)?;

        let enrollment_id = Uuid::new_v4();
        let now = time_provider.now();
        let schedule = BillingSchedule::new(terms.billing_day_of_month)?;
        let maturity_date = BillingSchedule::maturity_date(now, plan.duration_months)?;

        let state = EnrollmentState::new(enrollment_id, &tenant, &plan, &terms, now, maturity_date);

        let mut enrollment = Self {
            id: enrollment_id,
            tenant,
            plan,
            schedule,
            state,
            billing_months: Vec::new(),
            transactions: Vec::new(),
            redemption: None,
            events: EventStore::new(),
            snapshots: Vec::new(),
        };

        enrollment.events.emit(Event::EnrollmentOpened {
            enrollment_id,
            customer_id: enrollment.state.customer_id,
            metal_kind: enrollment.state.metal_kind,
            commitment_amount: enrollment.state.commitment_amount,
            maturity_date,
            timestamp: now,
        });

        // first billing month exists from day one
        let first = BillingSchedule::first_billing_month(now)?;
        enrollment.ensure_billing_month(first)?;

        enrollment.snapshots.push(StateSnapshot::capture(
            &enrollment.state,
            "enrollment".to_string(),
            now,
        ));

        Ok(enrollment)
    }

    /// billing month the enrollment started in
    pub fn first_billing_month(&self) -> Result<NaiveDate> {
        BillingSchedule::first_billing_month(self.state.start_date)
    }

    /// open a billing month row, idempotently.
    ///
    /// A duplicate open returns the existing row, so retries are harmless.
    pub fn open_billing_month(&mut self, month: NaiveDate) -> Result<&BillingMonth> {
        let idx = self.ensure_billing_month(month)?;
        Ok(&self.billing_months[idx])
    }

    fn ensure_billing_month(&mut self, month: NaiveDate) -> Result<usize> {
        let month = BillingSchedule::month_of(month)?;

        if let Some(idx) = self.billing_months.iter().position(|b| b.month == month) {
            return Ok(idx);
        }

        let due_date = self.schedule.due_date_for_month(month)?;
        self.events.emit(Event::BillingMonthOpened {
            enrollment_id: self.id,
            month,
            due_date,
        });
        self.billing_months
            .push(BillingMonth::open(self.id, month, due_date));

        Ok(self.billing_months.len() - 1)
    }

    /// monthly rollover: open one row per month from the first billing month
    /// through the current month, and mark overdue unpaid months missed
    pub fn advance_billing(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        // rollover applies to active enrollments only
        if !self.state.is_active() {
            return Ok(());
        }

        let now = time_provider.now();
        let today = now.date_naive();
        let current_month = BillingSchedule::month_of(today)?;

        let mut cursor = self.first_billing_month()?;
        while cursor <= current_month {
            self.ensure_billing_month(cursor)?;
            cursor = BillingSchedule::add_months(cursor, 1)?;
        }

        for row in self.billing_months.iter_mut() {
            if !row.primary_paid && row.status != BillingStatus::Missed && row.due_date < today {
                row.mark_missed();
                self.events.emit(Event::BillingMonthMissed {
                    enrollment_id: row.enrollment_id,
                    month: row.month,
                    due_date: row.due_date,
                    timestamp: now,
                });
            }
        }

        Ok(())
    }

    /// commitment status for the calendar month containing `month`
    pub fn monthly_status(&self, month: NaiveDate) -> MonthlyStatus {
        CommitmentLedger::new(self.state.commitment_amount).monthly_status(&self.transactions, month)
    }

    /// commitment status for the month containing now
    pub fn current_monthly_status(&self, time_provider: &SafeTimeProvider) -> MonthlyStatus {
        self.monthly_status(time_provider.now().date_naive())
    }

    /// record a payment at the current rate.
    ///
    /// The rate book is consulted at the moment of the call and the winning
    /// rate is snapshotted onto the transaction, immutable thereafter.
    pub fn record_payment(
        &mut self,
        amount: Money,
        mode: PaymentMode,
        source: PaymentSource,
        rates: &RateBook,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Transaction> {
        if !self.state.can_accept_payment() {
            return Err(SchemeError::EnrollmentNotActive {
                status: self.state.status,
            });
        }

        let now = time_provider.now();
        let month = BillingSchedule::month_of(now.date_naive())?;
        let month_idx = self.ensure_billing_month(month)?;

        let monthly = self.monthly_status(month);
        let allocation =
            PaymentAllocator::new(rates).allocate(amount, self.state.metal_kind, &monthly)?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            enrollment_id: self.id,
            customer_id: self.state.customer_id,
            amount_paid: allocation.amount,
            rate_per_gram: allocation.rate_per_gram,
            grams_allocated: allocation.grams_allocated,
            txn_type: allocation.txn_type,
            payment_status: PaymentStatus::Success,
            paid_at: now,
            mode,
            source,
            reference: format!("pay-{}", Uuid::new_v4()),
        };
        tracing::debug!(
            enrollment_id = %self.id,
            amount = %amount,
            txn_type = ?allocation.txn_type,
            rate = %allocation.rate_per_gram,
            "payment recorded"
        );
        self.transactions.push(transaction.clone());

        if transaction.is_primary() {
            let met = self.monthly_status(month);
            self.billing_months[month_idx].mark_paid();
            self.events.emit(Event::CommitmentMet {
                enrollment_id: self.id,
                month,
                total_paid: met.total_paid,
                timestamp: now,
            });
        }

        self.state.record_payment(
            allocation.amount,
            allocation.grams_allocated,
            allocation.txn_type,
            now,
        );

        self.events.emit(Event::PaymentRecorded {
            enrollment_id: self.id,
            transaction_id: transaction.id,
            amount: allocation.amount,
            rate_per_gram: allocation.rate_per_gram,
            grams_allocated: allocation.grams_allocated,
            txn_type: allocation.txn_type,
            timestamp: now,
        });

        self.snapshots.push(StateSnapshot::capture(
            &self.state,
            format!("payment: {}", amount),
            now,
        ));

        let idx = self.transactions.len() - 1;
        Ok(&self.transactions[idx])
    }

    /// redemption conditions as of now, recomputed from the transaction log
    pub fn eligibility(&self, time_provider: &SafeTimeProvider) -> EligibilityReport {
        let lifetime_primary = CommitmentLedger::new(self.state.commitment_amount)
            .lifetime_primary_paid(&self.transactions);
        EligibilityReport::evaluate(
            &self.state,
            lifetime_primary,
            time_provider.now().date_naive(),
        )
    }

    /// convert accumulated grams at the current rate and close the enrollment
    pub fn process_redemption(
        &mut self,
        processed_by: Uuid,
        rates: &RateBook,
        time_provider: &SafeTimeProvider,
    ) -> Result<Redemption> {
        if !self.state.is_active() {
            return Err(SchemeError::EnrollmentNotActive {
                status: self.state.status,
            });
        }

        let now = time_provider.now();
        let today = now.date_naive();
        self.eligibility(time_provider).ensure_eligible(today)?;

        // redemption values at the rate current right now, not the locked
        // historical snapshots
        let rate = rates.current(self.state.metal_kind)?;
        let grams = self.state.grams_accumulated;
        let total_value = grams.value_at(rate.price_per_gram);

        let redemption = Redemption {
            id: Uuid::new_v4(),
            enrollment_id: self.id,
            customer_id: self.state.customer_id,
            metal_kind: self.state.metal_kind,
            grams_redeemed: grams,
            rate_per_gram: rate.price_per_gram,
            total_value,
            status: RedemptionStatus::Pending,
            processed_by,
            processed_at: now,
        };

        self.events.emit(Event::RedemptionRequested {
            enrollment_id: self.id,
            redemption_id: redemption.id,
            grams_redeemed: grams,
            rate_per_gram: rate.price_per_gram,
            total_value,
            timestamp: now,
        });

        let old_status = self.state.status;
        self.state.update_status(EnrollmentStatus::Completed, now);
        self.events.emit(Event::StatusChanged {
            enrollment_id: self.id,
            old_status,
            new_status: EnrollmentStatus::Completed,
            reason: "redemption processed".to_string(),
            timestamp: now,
        });

        self.snapshots.push(StateSnapshot::capture(
            &self.state,
            format!("redemption: {}", grams),
            now,
        ));

        self.redemption = Some(redemption.clone());
        Ok(redemption)
    }

    /// flip the pending redemption to completed once delivered/paid out
    pub fn settle_redemption(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        let redemption = self
            .redemption
            .as_mut()
            .ok_or(SchemeError::NoPendingRedemption)?;

        if redemption.status == RedemptionStatus::Completed {
            return Err(SchemeError::RedemptionAlreadySettled {
                grams: redemption.grams_redeemed,
            });
        }

        redemption.status = RedemptionStatus::Completed;
        self.events.emit(Event::RedemptionSettled {
            enrollment_id: self.id,
            redemption_id: redemption.id,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    /// cancel an active enrollment before maturity
    pub fn cancel(&mut self, reason: String, time_provider: &SafeTimeProvider) -> Result<()> {
        if !self.state.is_active() {
            return Err(SchemeError::EnrollmentNotActive {
                status: self.state.status,
            });
        }

        let now = time_provider.now();
        let old_status = self.state.status;
        self.state.update_status(EnrollmentStatus::Cancelled, now);

        self.events.emit(Event::StatusChanged {
            enrollment_id: self.id,
            old_status,
            new_status: EnrollmentStatus::Cancelled,
            reason: reason.clone(),
            timestamp: now,
        });
        self.events.emit(Event::EnrollmentCancelled {
            enrollment_id: self.id,
            reason,
            timestamp: now,
        });

        self.snapshots.push(StateSnapshot::capture(
            &self.state,
            "cancellation".to_string(),
            now,
        ));

        Ok(())
    }

    /// drain collected events for the embedding application
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
