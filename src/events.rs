use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Grams, Money};
use crate::types::{CustomerId, EnrollmentId, EnrollmentStatus, MetalKind, TxnType};

/// all events that can be emitted by an enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    EnrollmentOpened {
        enrollment_id: EnrollmentId,
        customer_id: CustomerId,
        metal_kind: MetalKind,
        commitment_amount: Money,
        maturity_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    EnrollmentCancelled {
        enrollment_id: EnrollmentId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        enrollment_id: EnrollmentId,
        old_status: EnrollmentStatus,
        new_status: EnrollmentStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // billing events
    BillingMonthOpened {
        enrollment_id: EnrollmentId,
        month: NaiveDate,
        due_date: NaiveDate,
    },
    BillingMonthMissed {
        enrollment_id: EnrollmentId,
        month: NaiveDate,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        enrollment_id: EnrollmentId,
        transaction_id: Uuid,
        amount: Money,
        rate_per_gram: Money,
        grams_allocated: Grams,
        txn_type: TxnType,
        timestamp: DateTime<Utc>,
    },
    CommitmentMet {
        enrollment_id: EnrollmentId,
        month: NaiveDate,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },

    // redemption events
    RedemptionRequested {
        enrollment_id: EnrollmentId,
        redemption_id: Uuid,
        grams_redeemed: Grams,
        rate_per_gram: Money,
        total_value: Money,
        timestamp: DateTime<Utc>,
    },
    RedemptionSettled {
        enrollment_id: EnrollmentId,
        redemption_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
