pub mod allocation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Grams, Money};
use crate::errors::{Result, SchemeError};
use crate::types::{CustomerId, EnrollmentId, PaymentMode, PaymentSource, PaymentStatus, TxnType};

pub use allocation::{Allocation, PaymentAllocator};

/// one recorded payment, append-only.
///
/// `rate_per_gram` and `grams_allocated` are snapshots taken at payment
/// time; they are never recomputed when rates change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub enrollment_id: EnrollmentId,
    pub customer_id: CustomerId,
    pub amount_paid: Money,
    pub rate_per_gram: Money,
    pub grams_allocated: Grams,
    pub txn_type: TxnType,
    pub payment_status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
    pub mode: PaymentMode,
    pub source: PaymentSource,
    pub reference: String,
}

impl Transaction {
    pub fn is_successful(&self) -> bool {
        self.payment_status == PaymentStatus::Success
    }

    pub fn is_primary(&self) -> bool {
        self.txn_type == TxnType::PrimaryInstallment
    }
}

/// reject zero or negative payment amounts before any write
pub fn validate_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(SchemeError::InvalidAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Money::from_major(100)).is_ok());
        assert!(matches!(
            validate_amount(Money::ZERO),
            Err(SchemeError::InvalidAmount { .. })
        ));
        assert!(validate_amount(Money::from_decimal(dec!(-1))).is_err());
    }
}
