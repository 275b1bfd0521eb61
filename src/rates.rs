use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, SchemeError};
use crate::types::MetalKind;

/// one published rate, immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: Uuid,
    pub metal_kind: MetalKind,
    pub price_per_gram: Money,
    pub effective_from: DateTime<Utc>,
}

/// append-only book of published rates.
///
/// A rate change is always a new entry, never an edit, so transactions that
/// snapshotted an earlier rate keep it forever. There is no mutation or
/// deletion API.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RateBook {
    entries: Vec<RateEntry>,
}

impl RateBook {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// publish a new rate for a metal kind
    pub fn record(
        &mut self,
        metal_kind: MetalKind,
        price_per_gram: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<RateEntry> {
        if !price_per_gram.is_positive() {
            return Err(SchemeError::InvalidRate {
                price: price_per_gram,
            });
        }

        let entry = RateEntry {
            id: Uuid::new_v4(),
            metal_kind,
            price_per_gram,
            effective_from: time_provider.now(),
        };
        tracing::debug!(kind = %metal_kind, price = %price_per_gram, "rate recorded");

        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// current rate: the entry with the latest effective_from for the kind.
    ///
    /// Ties resolve toward the most recently appended entry.
    pub fn current(&self, metal_kind: MetalKind) -> Result<&RateEntry> {
        self.entries
            .iter()
            .filter(|e| e.metal_kind == metal_kind)
            .max_by(|a, b| {
                a.effective_from.cmp(&b.effective_from)
            })
            .ok_or(SchemeError::RateUnavailable { metal_kind })
    }

    /// look up a published entry by id
    pub fn entry(&self, id: Uuid) -> Option<&RateEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// all published entries for a kind, oldest first
    pub fn history(&self, metal_kind: MetalKind) -> Vec<&RateEntry> {
        self.entries
            .iter()
            .filter(|e| e.metal_kind == metal_kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;

    fn test_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_no_rate_configured() {
        let book = RateBook::new();
        assert!(matches!(
            book.current(MetalKind::Gold22K),
            Err(SchemeError::RateUnavailable {
                metal_kind: MetalKind::Gold22K
            })
        ));
    }

    #[test]
    fn test_latest_rate_wins() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let mut book = RateBook::new();

        book.record(MetalKind::Gold22K, Money::from_major(6_000), &time)
            .unwrap();
        control.advance(Duration::days(1));
        book.record(MetalKind::Gold22K, Money::from_major(6_150), &time)
            .unwrap();
        control.advance(Duration::days(1));
        book.record(MetalKind::Silver, Money::from_major(80), &time)
            .unwrap();

        let current = book.current(MetalKind::Gold22K).unwrap();
        assert_eq!(current.price_per_gram, Money::from_major(6_150));

        // other kinds are tracked independently
        let silver = book.current(MetalKind::Silver).unwrap();
        assert_eq!(silver.price_per_gram, Money::from_major(80));
    }

    #[test]
    fn test_rate_immutability() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let mut book = RateBook::new();

        let first = book
            .record(MetalKind::Gold24K, Money::from_major(6_500), &time)
            .unwrap();
        control.advance(Duration::hours(4));
        book.record(MetalKind::Gold24K, Money::from_major(6_650), &time)
            .unwrap();

        // the earlier entry is still retrievable, unchanged
        let stored = book.entry(first.id).unwrap();
        assert_eq!(stored, &first);
        assert_eq!(book.history(MetalKind::Gold24K).len(), 2);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let time = test_clock();
        let mut book = RateBook::new();

        assert!(matches!(
            book.record(MetalKind::Silver, Money::ZERO, &time),
            Err(SchemeError::InvalidRate { .. })
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_same_instant_tie_resolves_to_latest_append() {
        let time = test_clock();
        let mut book = RateBook::new();

        book.record(MetalKind::Gold22K, Money::from_major(6_000), &time)
            .unwrap();
        book.record(MetalKind::Gold22K, Money::from_major(6_050), &time)
            .unwrap();

        let current = book.current(MetalKind::Gold22K).unwrap();
        assert_eq!(current.price_per_gram, Money::from_major(6_050));
    }
}
