use chrono::{DateTime, FixedOffset, Local};

/// RFC 5322 `date-time`, with the numeric offset of the clock's zone.
pub const RFC5322_DATE: &str = "%a, %d %b %Y %H:%M:%S %z";

pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

// Wall clock in the local timezone
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
