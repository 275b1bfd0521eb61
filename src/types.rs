use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{Result, SchemeError};

/// unique identifier for an enrollment
pub type EnrollmentId = Uuid;

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// unique identifier for a retailer (tenant)
pub type RetailerId = Uuid;

/// metal purity classification tracked by the rate book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalKind {
    Gold18K,
    Gold22K,
    Gold24K,
    Silver,
}

impl MetalKind {
    /// all kinds with independently tracked rates
    pub const ALL: [MetalKind; 4] = [
        MetalKind::Gold18K,
        MetalKind::Gold22K,
        MetalKind::Gold24K,
        MetalKind::Silver,
    ];
}

impl fmt::Display for MetalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetalKind::Gold18K => "18K",
            MetalKind::Gold22K => "22K",
            MetalKind::Gold24K => "24K",
            MetalKind::Silver => "SILVER",
        };
        write!(f, "{}", label)
    }
}

/// enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    /// enrolled and collecting installments
    Active,
    /// redeemed and closed
    Completed,
    /// cancelled before maturity
    Cancelled,
}

/// billing month status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingStatus {
    /// commitment not yet satisfied, due date not passed
    Due,
    /// due date passed without a primary installment
    Missed,
    /// commitment satisfied
    Paid,
}

/// transaction classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnType {
    /// counts toward the month's commitment
    PrimaryInstallment,
    /// additional purchase beyond the commitment, never counted
    TopUp,
}

/// payment settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

/// how the payment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
    BankTransfer,
}

/// where the payment was recorded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSource {
    AdminDashboard,
    CustomerPortal,
}

/// redemption status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionStatus {
    Pending,
    Completed,
}

/// tenant scope and acting identity supplied with every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub retailer_id: RetailerId,
    pub actor_id: Uuid,
}

impl TenantContext {
    /// build a tenant context, rejecting an absent retailer scope
    pub fn new(retailer_id: RetailerId, actor_id: Uuid) -> Result<Self> {
        if retailer_id.is_nil() {
            return Err(SchemeError::MissingTenantScope);
        }
        Ok(Self {
            retailer_id,
            actor_id,
        })
    }
}
