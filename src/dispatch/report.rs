//! src/dispatch/report.rs
use crate::dispatch::{Delivery, Outcome};
use crate::domain::Address;
use serde::Serialize;

/// How many failures a [`RunSummary`] lists.
pub const REPORTED_FAILURES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub email: Address,
    pub error: String,
}

/// Everything known about a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Valid, deduplicated addresses before the daily cap was applied.
    pub total: usize,
    pub attempted: usize,
    /// Addresses left out by the daily cap.
    pub skipped: usize,
    pub sent: usize,
    pub failed: usize,
    /// Every failure, in the order it was recorded.
    pub failures: Vec<Failure>,
}

impl RunReport {
    /// The caller-facing view: `total` counts only the addresses that were
    /// attempted, and at most [`REPORTED_FAILURES`] failures are listed.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.attempted,
            sent: self.sent,
            failed: self.failed,
            errors: self
                .failures
                .iter()
                .take(REPORTED_FAILURES)
                .cloned()
                .collect(),
            candidates: self.total,
            skipped: self.skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<Failure>,
    pub candidates: usize,
    pub skipped: usize,
}

/// Sole owner of a run's report while batches are in flight.
///
/// Deliveries are folded in one at a time after each batch has joined, so the
/// counters never see concurrent writers.
#[derive(Debug)]
pub struct RunAggregator {
    report: RunReport,
}

impl RunAggregator {
    pub fn new(total: usize, skipped: usize) -> Self {
        Self {
            report: RunReport {
                total,
                skipped,
                ..RunReport::default()
            },
        }
    }

    pub fn record(&mut self, delivery: Delivery) {
        self.report.attempted += 1;
        match delivery.outcome {
            Outcome::Sent => self.report.sent += 1,
            Outcome::Failed(error) => {
                self.report.failed += 1;
                self.report.failures.push(Failure {
                    email: delivery.address,
                    error,
                });
            }
        }
    }

    pub fn record_all(&mut self, deliveries: impl IntoIterator<Item = Delivery>) {
        for delivery in deliveries {
            self.record(delivery);
        }
    }

    pub fn finish(self) -> RunReport {
        self.report
    }
}
