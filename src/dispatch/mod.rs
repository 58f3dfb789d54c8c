//! src/dispatch/mod.rs
mod planner;
pub use planner::{plan, Limits, Plan, DEFAULT_BATCH_SIZE, DEFAULT_DAILY_CAP};

mod worker;
pub use worker::{deliver, Delivery, Outcome};

mod report;
pub use report::{Failure, RunAggregator, RunReport, RunSummary, REPORTED_FAILURES};

mod request;
pub use request::{DispatchConfig, RunRequest, ValidationError, DEFAULT_BATCH_DELAY};

mod dispatcher;
pub use dispatcher::dispatch;
