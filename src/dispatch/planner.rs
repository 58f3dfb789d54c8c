//! src/dispatch/planner.rs
use crate::domain::Address;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_DAILY_CAP: usize = 300;

/// Batch width and per-run cap. Both are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    batch_size: usize,
    daily_cap: usize,
}

impl Limits {
    /// Non-positive values are replaced by [`DEFAULT_BATCH_SIZE`] and
    /// [`DEFAULT_DAILY_CAP`] rather than rejected.
    pub fn new(batch_size: i64, daily_cap: i64) -> Self {
        Self {
            batch_size: positive_or(batch_size, DEFAULT_BATCH_SIZE),
            daily_cap: positive_or(daily_cap, DEFAULT_DAILY_CAP),
        }
    }

    /// As [`Limits::new`], with missing or unparsable values also taking the default.
    pub fn from_raw(batch_size: Option<&str>, daily_cap: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
        Self::new(parse(batch_size), parse(daily_cap))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn daily_cap(&self) -> usize {
        self.daily_cap
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            daily_cap: DEFAULT_DAILY_CAP,
        }
    }
}

fn positive_or(value: i64, default: usize) -> usize {
    match usize::try_from(value) {
        Ok(value) if value > 0 => value,
        _ => default,
    }
}

/// The batches of a run, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub batches: Vec<Vec<Address>>,
    /// Addresses dropped because they came after the daily cap.
    pub skipped: usize,
}

impl Plan {
    pub fn attempted(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Keeps the first `daily_cap` addresses and cuts them into consecutive batches
/// of `batch_size`; only the last batch may be shorter.
pub fn plan(mut addresses: Vec<Address>, limits: Limits) -> Plan {
    let skipped = addresses.len().saturating_sub(limits.daily_cap());
    addresses.truncate(limits.daily_cap());

    let batches = addresses
        .chunks(limits.batch_size())
        .map(<[Address]>::to_vec)
        .collect();

    Plan { batches, skipped }
}
