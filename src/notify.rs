use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Mutex;
use thiserror::Error;

use crate::events::Event;
use crate::types::{CustomerId, EnrollmentId, RetailerId, TenantContext};

/// notification delivery failure
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// notification categories surfaced to customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    EnrollmentOpened,
    PaymentRecorded,
    RedemptionRequested,
}

/// outbound customer notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub retailer_id: RetailerId,
    pub customer_id: CustomerId,
    pub enrollment_id: EnrollmentId,
    pub kind: NotificationKind,
    pub message: String,
    pub metadata: serde_json::Value,
}

impl Notification {
    /// map an outward-facing event to a customer notification.
    ///
    /// Internal bookkeeping events (billing rows, status flips) return None.
    pub fn from_event(
        tenant: &TenantContext,
        customer_id: CustomerId,
        event: &Event,
    ) -> Option<Notification> {
        match event {
            Event::EnrollmentOpened {
                enrollment_id,
                metal_kind,
                commitment_amount,
                maturity_date,
                ..
            } => Some(Notification {
                retailer_id: tenant.retailer_id,
                customer_id,
                enrollment_id: *enrollment_id,
                kind: NotificationKind::EnrollmentOpened,
                message: format!(
                    "Your {} savings plan is active: {} per month until {}",
                    metal_kind, commitment_amount, maturity_date
                ),
                metadata: json!({
                    "metal_kind": metal_kind,
                    "commitment_amount": commitment_amount,
                    "maturity_date": maturity_date,
                }),
            }),
            Event::PaymentRecorded {
                enrollment_id,
                amount,
                rate_per_gram,
                grams_allocated,
                txn_type,
                ..
            } => Some(Notification {
                retailer_id: tenant.retailer_id,
                customer_id,
                enrollment_id: *enrollment_id,
                kind: NotificationKind::PaymentRecorded,
                message: format!(
                    "Payment of {} received: {} locked at {}/g",
                    amount,
                    grams_allocated.round_dp(4),
                    rate_per_gram
                ),
                metadata: json!({
                    "amount": amount,
                    "rate_per_gram": rate_per_gram,
                    "grams_allocated": grams_allocated,
                    "txn_type": txn_type,
                }),
            }),
            Event::RedemptionRequested {
                enrollment_id,
                grams_redeemed,
                rate_per_gram,
                total_value,
                ..
            } => Some(Notification {
                retailer_id: tenant.retailer_id,
                customer_id,
                enrollment_id: *enrollment_id,
                kind: NotificationKind::RedemptionRequested,
                message: format!(
                    "Redemption of {} requested at {}/g, value {}",
                    grams_redeemed.round_dp(4),
                    rate_per_gram,
                    total_value
                ),
                metadata: json!({
                    "grams_redeemed": grams_redeemed,
                    "rate_per_gram": rate_per_gram,
                    "total_value": total_value,
                }),
            }),
            _ => None,
        }
    }
}

/// delivery channel for customer notifications (sms, push, in-app)
pub trait NotificationSink {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// sink that drops everything
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// in-memory sink for embedding and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .map_err(|_| NotifyError("memory sink poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

/// fire-and-forget delivery: a sink failure is logged and swallowed, never
/// rolled back into the operation that produced the notification
pub fn dispatch_best_effort(sink: &dyn NotificationSink, notification: &Notification) {
    if let Err(err) = sink.notify(notification) {
        tracing::warn!(
            enrollment_id = %notification.enrollment_id,
            kind = ?notification.kind,
            error = %err,
            "notification delivery failed, continuing"
        );
    }
}
