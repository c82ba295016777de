use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use events_queries::Clock;

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self { Self { now } }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.now }
}

/// Wall-clock time in `tz` as an absolute instant. Panics on times a DST
/// transition skips or repeats.
pub fn local_time(
    tz: Tz, year: i32, month: u32, day: u32, hour: u32, minute: u32,
) -> DateTime<Utc> {
    tz.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| {
            panic!("{year}-{month}-{day} {hour}:{minute} is not a unique local time in {tz}")
        })
}
