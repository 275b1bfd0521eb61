use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::MonthlyStatus;
use crate::decimal::{Grams, Money};
use crate::errors::{Result, SchemeError};
use crate::rates::RateBook;
use crate::types::{MetalKind, TxnType};

use super::validate_amount;

/// outcome of allocating a payment against the current rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub amount: Money,
    pub rate_id: Uuid,
    pub rate_per_gram: Money,
    pub grams_allocated: Grams,
    pub txn_type: TxnType,
}

/// converts a payment amount into grams at the current rate and classifies
/// it against the month's commitment.
///
/// Classification policy: once the month's commitment is met, every further
/// payment that month is a top-up. Until it is met, a payment must cover the
/// full remaining commitment in one transaction; partial primary
/// installments are rejected with the exact shortfall.
pub struct PaymentAllocator<'a> {
    rates: &'a RateBook,
}

impl<'a> PaymentAllocator<'a> {
    pub fn new(rates: &'a RateBook) -> Self {
        Self { rates }
    }

    pub fn allocate(
        &self,
        amount: Money,
        metal_kind: MetalKind,
        monthly: &MonthlyStatus,
    ) -> Result<Allocation> {
        validate_amount(amount)?;

        // the rate is re-fetched at the moment of payment; the most recently
        // recorded rate wins
        let rate = self.rates.current(metal_kind)?;

        let txn_type = if monthly.is_met {
            TxnType::TopUp
        } else if amount < monthly.remaining {
            return Err(SchemeError::InsufficientAmount {
                remaining: monthly.remaining,
                provided: amount,
                shortfall: monthly.remaining - amount,
            });
        } else {
            TxnType::PrimaryInstallment
        };

        Ok(Allocation {
            amount,
            rate_id: rate.id,
            rate_per_gram: rate.price_per_gram,
            grams_allocated: Grams::allocate(amount, rate.price_per_gram),
            txn_type,
        })
    }
}
