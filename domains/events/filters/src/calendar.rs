use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime,
    NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use events_models::City;

/// Seconds from local midnight to 23:59:59.
const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Absolute time span; both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Day and week boundaries of one city's local calendar, frozen at `now`.
///
/// Weeks run Monday to Sunday. The weekend is Friday through Sunday; once
/// it has started, "weekend" covers what is left of it, starting today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityCalendar {
    tz: Tz,
    now: DateTime<Utc>,
}

impl CityCalendar {
    pub fn new(tz: Tz, now: DateTime<Utc>) -> Self { Self { tz, now } }

    pub fn for_city(city: &City, now: DateTime<Utc>) -> Self {
        Self::new(city.timezone, now)
    }

    pub fn now(&self) -> DateTime<Utc> { self.now }

    pub fn timezone(&self) -> Tz { self.tz }

    pub fn local_today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }

    /// Resolve a wall-clock time in this city to an absolute instant.
    /// Ambiguous times take the earlier reading; times skipped by a DST
    /// jump move forward by an hour.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                dt.with_timezone(&Utc)
            }
            LocalResult::None => {
                self.tz
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| naive.and_utc())
            }
        }
    }

    fn span(&self, first: NaiveDate, last: NaiveDate) -> Window {
        let start = first.and_time(NaiveTime::MIN);
        let end =
            last.and_time(NaiveTime::MIN) + Duration::seconds(LAST_SECOND_OF_DAY);
        Window {
            start: self.localize(start),
            end: self.localize(end),
        }
    }

    pub fn day(&self, date: NaiveDate) -> Window { self.span(date, date) }

    pub fn today(&self) -> Window { self.day(self.local_today()) }

    pub fn tomorrow(&self) -> Window {
        self.day(self.local_today() + Duration::days(1))
    }

    fn days_from_monday(&self) -> i64 {
        i64::from(self.local_today().weekday().num_days_from_monday())
    }

    fn monday(&self) -> NaiveDate {
        self.local_today() - Duration::days(self.days_from_monday())
    }

    pub fn this_week(&self) -> Window {
        self.span(self.local_today(), self.monday() + Duration::days(6))
    }

    pub fn weekend(&self) -> Window {
        let friday = self.monday() + Duration::days(4);
        let sunday = friday + Duration::days(2);
        let today = self.local_today();
        let first = if today > friday { today } else { friday };
        self.span(first, sunday)
    }

    pub fn next_week(&self) -> Window {
        let next_monday = self.monday() + Duration::days(7);
        self.span(next_monday, next_monday + Duration::days(6))
    }

    pub fn next_weekend(&self) -> Window {
        let friday = self.monday() + Duration::days(11);
        self.span(friday, friday + Duration::days(2))
    }

    /// Lower bound of an explicit `since` parameter, read as local time.
    pub fn since(&self, since: NaiveDateTime) -> DateTime<Utc> {
        self.localize(since)
    }

    /// Upper bound of an explicit `until` parameter: the last second of its
    /// local day.
    pub fn until(&self, until: NaiveDateTime) -> DateTime<Utc> {
        self.day(until.date()).end
    }
}
