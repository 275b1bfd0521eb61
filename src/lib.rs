pub mod billing;
pub mod config;
pub mod decimal;
pub mod enrollment;
pub mod errors;
pub mod events;
pub mod notify;
pub mod payments;
pub mod portfolio;
pub mod rates;
pub mod redemption;
pub mod state;
pub mod types;

// re-export key types
pub use billing::{BillingMonth, BillingSchedule, CommitmentLedger, MonthlyStatus};
pub use config::{EnrollmentTerms, PlanConfig};
pub use decimal::{Grams, Money};
pub use enrollment::Enrollment;
pub use errors::{Result, SchemeError};
pub use events::{Event, EventStore};
pub use notify::{
    dispatch_best_effort, MemorySink, NoopSink, Notification, NotificationKind, NotificationSink,
    NotifyError,
};
pub use payments::{Allocation, PaymentAllocator, Transaction};
pub use portfolio::{Customer, Portfolio};
pub use rates::{RateBook, RateEntry};
pub use redemption::{EligibilityReport, Redemption};
pub use state::{EnrollmentState, StateSnapshot};
pub use types::{
    BillingStatus, CustomerId, EnrollmentId, EnrollmentStatus, MetalKind, PaymentMode,
    PaymentSource, PaymentStatus, RedemptionStatus, RetailerId, TenantContext, TxnType,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
