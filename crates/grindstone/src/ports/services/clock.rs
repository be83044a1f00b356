//! Clock Port

use chrono::{DateTime, NaiveDate, Utc};

/// Wall-clock time. Calendar dates are taken in UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
