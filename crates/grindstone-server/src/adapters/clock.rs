//! System clock

use chrono::{DateTime, Utc};

use grindstone::Clock;

/// Real wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
