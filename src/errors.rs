use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Grams, Money};
use crate::types::{EnrollmentStatus, MetalKind};

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("no rate configured for {metal_kind}: update rates in the rate dashboard")]
    RateUnavailable {
        metal_kind: MetalKind,
    },

    #[error("invalid rate: {price} per gram")]
    InvalidRate {
        price: Money,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("installment below remaining commitment: remaining {remaining}, provided {provided}, short by {shortfall}")]
    InsufficientAmount {
        remaining: Money,
        provided: Money,
        shortfall: Money,
    },

    #[error("commitment below plan minimum: minimum {minimum}, provided {provided}")]
    CommitmentBelowMinimum {
        minimum: Money,
        provided: Money,
    },

    #[error("invalid billing day of month: {day}")]
    InvalidBillingDay {
        day: u8,
    },

    #[error("enrollment not active: current status is {status:?}")]
    EnrollmentNotActive {
        status: EnrollmentStatus,
    },

    #[error("enrollment not matured: matures {maturity_date}, today is {current_date}")]
    NotYetMatured {
        maturity_date: NaiveDate,
        current_date: NaiveDate,
    },

    #[error("nothing accumulated: no grams allocated to this enrollment")]
    NothingAccumulated,

    #[error("commitment shortfall: expected {expected} over the full term, paid {paid}")]
    CommitmentShortfall {
        expected: Money,
        paid: Money,
    },

    #[error("redemption already settled: {grams} delivered")]
    RedemptionAlreadySettled {
        grams: Grams,
    },

    #[error("no pending redemption to settle")]
    NoPendingRedemption,

    #[error("enrollment not found: {id}")]
    EnrollmentNotFound {
        id: Uuid,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: Uuid,
    },

    #[error("tenant scope missing: operations require a retailer id")]
    MissingTenantScope,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, SchemeError>;
