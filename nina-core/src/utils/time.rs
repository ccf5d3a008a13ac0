// File: nina-core/src/utils/time.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use nina_common::error::Error;

/// Parses an IANA timezone name ("America/Sao_Paulo") into a [`Tz`].
pub fn parse_timezone(name: &str) -> Result<Tz, Error> {
    name.parse::<Tz>()
        .map_err(|_| Error::Parse(format!("Unknown timezone: {name}")))
}

/// The three time windows every dashboard metric is measured against,
/// all derived from one reference instant so a single snapshot never
/// mixes clock readings.
///
/// - last 24 hours: `(reference - 24h, ..]`, lower bound exclusive
/// - last 30 days:  `[reference - 30d, ..]`, lower bound inclusive
/// - today:         the reference instant's calendar day in the clinic
///   timezone, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindows {
    reference: DateTime<Utc>,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    last_24h_start: DateTime<Utc>,
    month_start: DateTime<Utc>,
}

impl TimeWindows {
    /// Builds the windows for `reference`, resolving "today" in the
    /// given clinic timezone.
    pub fn at(reference: DateTime<Utc>, tz: Tz) -> Self {
        let local_day = reference.with_timezone(&tz).date_naive();
        let day_start = local_day_start(local_day, tz);
        let next_day = local_day.succ_opt().unwrap_or(local_day);
        // Last representable microsecond of the local day; timestamps
        // in Postgres carry microsecond precision.
        let day_end = local_day_start(next_day, tz) - Duration::microseconds(1);
        Self {
            reference,
            day_start,
            day_end,
            last_24h_start: reference - Duration::hours(24),
            month_start: reference - Duration::days(30),
        }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn day_start(&self) -> DateTime<Utc> {
        self.day_start
    }

    pub fn day_end(&self) -> DateTime<Utc> {
        self.day_end
    }

    pub fn month_start(&self) -> DateTime<Utc> {
        self.month_start
    }

    /// True when `t` falls in the last 24 hours. An event exactly 24h
    /// old is already outside the window.
    pub fn in_last_24h(&self, t: DateTime<Utc>) -> bool {
        t > self.last_24h_start
    }

    /// True when `t` falls in the last 30 days, boundary included.
    pub fn in_last_30d(&self, t: DateTime<Utc>) -> bool {
        t >= self.month_start
    }

    /// True when `t` falls on the reference instant's local calendar
    /// day, both bounds included.
    pub fn is_today(&self, t: DateTime<Utc>) -> bool {
        self.day_start <= t && t <= self.day_end
    }
}

/// First valid instant of `day` in `tz`. A DST transition can skip
/// local midnight entirely, so probe forward hour by hour and take the
/// earliest wall-clock time that exists.
fn local_day_start(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    for hour in 0..4 {
        let Some(naive) = day.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        if let Some(local) = tz.from_local_datetime(&naive).earliest() {
            return local.with_timezone(&Utc);
        }
    }
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}
