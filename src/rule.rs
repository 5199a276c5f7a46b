//! The input contract: `RRule` and its builder.
//!
//! This mirrors the teacher's `RecurrenceRuleBuilder` shape almost exactly —
//! an `Arc`-shared inner struct built up through a mutable builder and
//! validated once, eagerly, in `build()` — but narrows the grammar to what
//! spec.md's core supports (YEARLY/MONTHLY/WEEKLY/DAILY only; no HOURLY,
//! MINUTELY or SECONDLY frequency).

use std::sync::Arc;

use jiff::tz::TimeZone;

pub use jiff::civil::Weekday;

use crate::occurrence::Occurrence;

/// The frequency at which a rule repeats.
///
/// Unlike the teacher's own `Frequency` (which also has `Hourly`, `Minutely`
/// and `Secondly`), this core does not accept sub-daily frequencies at all —
/// see spec.md's Non-goals and the Open Question resolution in DESIGN.md.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match *self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Frequency> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "YEARLY" => Frequency::Yearly,
            "MONTHLY" => Frequency::Monthly,
            "WEEKLY" => Frequency::Weekly,
            "DAILY" => Frequency::Daily,
            "HOURLY" | "MINUTELY" | "SECONDLY" => anyhow::bail!(
                "FREQ={s} is a sub-daily frequency, which this recurrence \
                 engine does not support (it would require iterating every \
                 hour/minute/second, which is out of scope for this core)",
            ),
            other => anyhow::bail!("unrecognized FREQ value: `{other}`"),
        })
    }
}

/// A (ordinal, weekday) pair, e.g. the `-1FR` in `BYDAY=-1FR`.
///
/// Ordinal `0` means "every occurrence of this weekday in the enclosing
/// period" (RFC 5545's bare `BYDAY=FR`, the teacher's `ByWeekday::Any`).
/// Ordinal outside `0` means "the Nth occurrence counting from the start of
/// the period (positive) or from the end (negative)" (the teacher's
/// `ByWeekday::Numbered`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WeekdayNum {
    pub ordinal: i8,
    pub weekday: Weekday,
}

impl WeekdayNum {
    pub fn every(weekday: Weekday) -> WeekdayNum {
        WeekdayNum { ordinal: 0, weekday }
    }

    pub fn nth(ordinal: i8, weekday: Weekday) -> WeekdayNum {
        WeekdayNum { ordinal, weekday }
    }

    pub fn is_every(&self) -> bool {
        self.ordinal == 0
    }

    fn weekday_rank(&self) -> u8 {
        // Sunday-based rank, matching RFC 5545's own enumeration order.
        match self.weekday {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }
}

// `Ord`/`PartialOrd` exist only so `by_day` lists can be sorted and
// deduplicated; the generators never rely on this particular order.
impl Ord for WeekdayNum {
    fn cmp(&self, other: &WeekdayNum) -> std::cmp::Ordering {
        (self.ordinal, self.weekday_rank()).cmp(&(other.ordinal, other.weekday_rank()))
    }
}

impl PartialOrd for WeekdayNum {
    fn partial_cmp(&self, other: &WeekdayNum) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.ordinal != 0 {
            write!(f, "{}", self.ordinal)?;
        }
        let wd = match self.weekday {
            Weekday::Sunday => "SU",
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
            Weekday::Saturday => "SA",
        };
        write!(f, "{wd}")
    }
}

impl std::str::FromStr for WeekdayNum {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<WeekdayNum> {
        let idx = s.rfind(|c: char| c.is_ascii_alphabetic()).and_then(|i| {
            // The weekday code is always the trailing two letters.
            (i + 1 == s.len()).then(|| s.len() - 2)
        });
        let Some(split) = idx else {
            anyhow::bail!("invalid BYDAY value: `{s}`");
        };
        let (ordinal_str, wd_str) = s.split_at(split);
        let weekday = parse_weekday_code(wd_str)?;
        let ordinal = if ordinal_str.is_empty() {
            0
        } else {
            ordinal_str
                .parse::<i8>()
                .map_err(|_| anyhow::anyhow!("invalid BYDAY ordinal: `{ordinal_str}`"))?
        };
        Ok(WeekdayNum { ordinal, weekday })
    }
}

fn parse_weekday_code(s: &str) -> anyhow::Result<Weekday> {
    Ok(match s.to_ascii_uppercase().as_str() {
        "SU" => Weekday::Sunday,
        "MO" => Weekday::Monday,
        "TU" => Weekday::Tuesday,
        "WE" => Weekday::Wednesday,
        "TH" => Weekday::Thursday,
        "FR" => Weekday::Friday,
        "SA" => Weekday::Saturday,
        other => anyhow::bail!("invalid weekday code: `{other}`"),
    })
}

/// The field a singleton BYHOUR/BYMINUTE/BYSECOND value forces on every
/// emitted occurrence's time-of-day. See spec.md §4.3 "Forced time-of-day".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ForcedTimeOfDay {
    Hour(i8),
    Minute(i8),
    Second(i8),
}

/// A fully validated RFC 5545 recurrence rule, paired with the series start
/// it was built against.
///
/// Cheap to clone: the validated contents are shared behind an `Arc`, the
/// same choice the teacher makes for `RecurrenceRule`.
#[derive(Clone, Debug)]
pub struct RRule {
    pub(crate) inner: Arc<RRuleInner>,
}

#[derive(Debug)]
pub(crate) struct RRuleInner {
    pub freq: Frequency,
    pub interval: i32,
    pub wkst: Weekday,
    pub until: Option<Occurrence>,
    pub count: u32,
    pub by_month: Box<[i8]>,
    pub by_week_no: Box<[i8]>,
    pub by_year_day: Box<[i16]>,
    pub by_month_day: Box<[i8]>,
    pub by_day: Box<[WeekdayNum]>,
    pub by_hour: Box<[i8]>,
    pub by_minute: Box<[i8]>,
    pub by_second: Box<[i8]>,
    pub by_set_pos: Box<[i32]>,
    pub dt_start: Occurrence,
    pub time_zone: TimeZone,
    pub forced_time: Option<ForcedTimeOfDay>,
}

impl RRule {
    /// Returns a builder for constructing an `RRule`.
    pub fn builder(freq: Frequency, dt_start: Occurrence) -> RRuleBuilder {
        RRuleBuilder::new(freq, dt_start)
    }

    pub fn frequency(&self) -> Frequency {
        self.inner.freq
    }

    pub fn dt_start(&self) -> Occurrence {
        self.inner.dt_start
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.inner.time_zone
    }
}

/// A builder for constructing a valid `RRule`.
///
/// Every `by_*` setter accepts anything that can be turned into a list of
/// the corresponding value type, exactly like the teacher's
/// `RecurrenceRuleBuilder` (a single value, an array, or a range).
#[derive(Clone, Debug)]
pub struct RRuleBuilder {
    freq: Frequency,
    dt_start: Occurrence,
    time_zone: TimeZone,
    until: Option<Occurrence>,
    interval: i32,
    count: u32,
    by_month: Vec<i8>,
    by_week_no: Vec<i8>,
    by_year_day: Vec<i16>,
    by_month_day: Vec<i8>,
    by_day: Vec<WeekdayNum>,
    by_hour: Vec<i8>,
    by_minute: Vec<i8>,
    by_second: Vec<i8>,
    by_set_pos: Vec<i32>,
    wkst: Weekday,
}

impl RRuleBuilder {
    fn new(freq: Frequency, dt_start: Occurrence) -> RRuleBuilder {
        RRuleBuilder {
            freq,
            dt_start,
            time_zone: TimeZone::UTC,
            until: None,
            interval: 1,
            count: 0,
            by_month: vec![],
            by_week_no: vec![],
            by_year_day: vec![],
            by_month_day: vec![],
            by_day: vec![],
            by_hour: vec![],
            by_minute: vec![],
            by_second: vec![],
            by_set_pos: vec![],
            wkst: Weekday::Monday,
        }
    }

    pub fn time_zone(&mut self, tz: TimeZone) -> &mut RRuleBuilder {
        self.time_zone = tz;
        self
    }

    pub fn until(&mut self, until: Occurrence) -> &mut RRuleBuilder {
        self.until = Some(until);
        self
    }

    /// Sets COUNT. A value of `0` means "unset" (RFC 5545 does not permit
    /// COUNT=0 in practice, and spec.md §3 explicitly uses `0` as the unset
    /// sentinel).
    pub fn count(&mut self, count: u32) -> &mut RRuleBuilder {
        self.count = count;
        self
    }

    /// Sets INTERVAL. Per spec.md §4.3, a non-positive value is coerced to
    /// `1` rather than rejected.
    pub fn interval(&mut self, interval: i32) -> &mut RRuleBuilder {
        self.interval = if interval <= 0 { 1 } else { interval };
        self
    }

    pub fn by_month(&mut self, months: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_month.extend(months);
        self
    }

    pub fn by_week_no(&mut self, weeks: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_week_no.extend(weeks);
        self
    }

    pub fn by_year_day(&mut self, days: impl IntoIterator<Item = i16>) -> &mut RRuleBuilder {
        self.by_year_day.extend(days);
        self
    }

    pub fn by_month_day(&mut self, days: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_month_day.extend(days);
        self
    }

    pub fn by_day(&mut self, days: impl IntoIterator<Item = WeekdayNum>) -> &mut RRuleBuilder {
        self.by_day.extend(days);
        self
    }

    pub fn by_hour(&mut self, hours: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_hour.extend(hours);
        self
    }

    pub fn by_minute(&mut self, minutes: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_minute.extend(minutes);
        self
    }

    pub fn by_second(&mut self, seconds: impl IntoIterator<Item = i8>) -> &mut RRuleBuilder {
        self.by_second.extend(seconds);
        self
    }

    pub fn by_set_pos(&mut self, positions: impl IntoIterator<Item = i32>) -> &mut RRuleBuilder {
        self.by_set_pos.extend(positions);
        self
    }

    pub fn week_start(&mut self, wkst: Weekday) -> &mut RRuleBuilder {
        self.wkst = wkst;
        self
    }

    /// Validates and builds the rule. Mirrors the teacher's
    /// `RecurrenceRuleBuilder::build`: one `anyhow::ensure!` per invariant,
    /// sort-and-dedup every by-list up front so generators never have to.
    pub fn build(&self) -> anyhow::Result<RRule> {
        fn sort_and_dedup<T: Ord + Copy>(xs: &[T]) -> Box<[T]> {
            let mut v = xs.to_vec();
            v.sort();
            v.dedup();
            v.into_boxed_slice()
        }

        for &v in self.by_month.iter() {
            anyhow::ensure!(
                1 <= v && v <= 12,
                "invalid BYMONTH value `{v}` (must be in 1..=12)",
            );
        }
        for &v in self.by_week_no.iter() {
            anyhow::ensure!(
                (-53 <= v && v <= -1) || (1 <= v && v <= 53),
                "invalid BYWEEKNO value `{v}` (must be in 1..=53 or -53..=-1)",
            );
            anyhow::ensure!(
                matches!(self.freq, Frequency::Yearly),
                "BYWEEKNO is only valid at YEARLY frequency",
            );
        }
        for &v in self.by_year_day.iter() {
            anyhow::ensure!(
                (-366 <= v && v <= -1) || (1 <= v && v <= 366),
                "invalid BYYEARDAY value `{v}` (must be in 1..=366 or -366..=-1)",
            );
        }
        for &v in self.by_month_day.iter() {
            anyhow::ensure!(
                (-31 <= v && v <= -1) || (1 <= v && v <= 31),
                "invalid BYMONTHDAY value `{v}` (must be in 1..=31 or -31..=-1)",
            );
        }
        for wd in self.by_day.iter() {
            if wd.is_every() {
                continue;
            }
            anyhow::ensure!(
                matches!(self.freq, Frequency::Yearly | Frequency::Monthly),
                "numbered BYDAY value `{wd}` is only allowed at YEARLY or \
                 MONTHLY frequency",
            );
            anyhow::ensure!(
                !matches!(self.freq, Frequency::Yearly) || self.by_week_no.is_empty(),
                "numbered BYDAY value `{wd}` is not allowed together with \
                 BYWEEKNO at YEARLY frequency",
            );
            let bounds = if matches!(self.freq, Frequency::Yearly) && self.by_month.is_empty() {
                1..=53i8
            } else {
                1..=5i8
            };
            let n = wd.ordinal;
            anyhow::ensure!(
                bounds.contains(&n.abs()),
                "invalid numbered BYDAY value `{wd}` (ordinal out of range)",
            );
        }
        for &v in self.by_hour.iter() {
            anyhow::ensure!(0 <= v && v <= 23, "invalid BYHOUR value `{v}`");
        }
        for &v in self.by_minute.iter() {
            anyhow::ensure!(0 <= v && v <= 59, "invalid BYMINUTE value `{v}`");
        }
        for &v in self.by_second.iter() {
            anyhow::ensure!(0 <= v && v <= 60, "invalid BYSECOND value `{v}`");
        }
        for &v in self.by_set_pos.iter() {
            anyhow::ensure!(v != 0, "BYSETPOS value must not be zero");
        }
        anyhow::ensure!(
            self.by_set_pos.is_empty()
                || !(self.by_month.is_empty()
                    && self.by_week_no.is_empty()
                    && self.by_year_day.is_empty()
                    && self.by_month_day.is_empty()
                    && self.by_day.is_empty()),
            "BYSETPOS requires at least one other BY* rule part",
        );

        // Forced time-of-day: per spec.md §4.3, at most one of
        // BYHOUR/BYMINUTE/BYSECOND may carry a (singleton) value, since this
        // core does not support multi-valued sub-daily expansion.
        let nonempty = [
            !self.by_hour.is_empty(),
            !self.by_minute.is_empty(),
            !self.by_second.is_empty(),
        ]
        .into_iter()
        .filter(|&b| b)
        .count();
        anyhow::ensure!(
            nonempty <= 1,
            "at most one of BYHOUR, BYMINUTE or BYSECOND may be set; this \
             core does not support multi-valued sub-daily expansion",
        );
        let forced_time = if !self.by_hour.is_empty() {
            anyhow::ensure!(
                self.by_hour.len() == 1,
                "BYHOUR must be a single value in this core",
            );
            Some(ForcedTimeOfDay::Hour(self.by_hour[0]))
        } else if !self.by_minute.is_empty() {
            anyhow::ensure!(
                self.by_minute.len() == 1,
                "BYMINUTE must be a single value in this core",
            );
            Some(ForcedTimeOfDay::Minute(self.by_minute[0]))
        } else if !self.by_second.is_empty() {
            anyhow::ensure!(
                self.by_second.len() == 1,
                "BYSECOND must be a single value in this core",
            );
            Some(ForcedTimeOfDay::Second(self.by_second[0]))
        } else {
            None
        };
        if forced_time.is_some() {
            anyhow::ensure!(
                matches!(self.dt_start, Occurrence::DateTime(_)),
                "BYHOUR/BYMINUTE/BYSECOND requires a timed DTSTART",
            );
        }

        // UNTIL's value type is coerced to match DTSTART's, per spec.md §7
        // TypeMismatch: logged, not rejected.
        let until = self.until.map(|u| coerce_until_type(u, self.dt_start));

        Ok(RRule {
            inner: Arc::new(RRuleInner {
                freq: self.freq,
                interval: self.interval,
                wkst: self.wkst,
                until,
                count: self.count,
                by_month: sort_and_dedup(&self.by_month),
                by_week_no: sort_and_dedup(&self.by_week_no),
                by_year_day: sort_and_dedup(&self.by_year_day),
                by_month_day: sort_and_dedup(&self.by_month_day),
                by_day: sort_and_dedup(&self.by_day),
                by_hour: sort_and_dedup(&self.by_hour),
                by_minute: sort_and_dedup(&self.by_minute),
                by_second: sort_and_dedup(&self.by_second),
                by_set_pos: sort_and_dedup(&self.by_set_pos),
                dt_start: self.dt_start,
                time_zone: self.time_zone.clone(),
                forced_time,
            }),
        })
    }
}

/// Coerces `until`'s value type (DATE vs DATE-TIME) to match `dt_start`'s,
/// per spec.md §7's TypeMismatch rule: down-convert to a date, or to
/// start-of-day, logging the coercion.
fn coerce_until_type(until: Occurrence, dt_start: Occurrence) -> Occurrence {
    match (until, dt_start) {
        (Occurrence::Date(_), Occurrence::Date(_))
        | (Occurrence::DateTime(_), Occurrence::DateTime(_)) => until,
        (Occurrence::DateTime(ts), Occurrence::Date(_)) => {
            log::warn!(
                "UNTIL is a date-time but DTSTART is a bare date; \
                 truncating UNTIL `{ts}` to its calendar date",
            );
            let zoned = ts.to_zoned(TimeZone::UTC);
            Occurrence::Date(zoned.date())
        }
        (Occurrence::Date(d), Occurrence::DateTime(_)) => {
            log::warn!(
                "UNTIL is a bare date but DTSTART is a date-time; \
                 treating UNTIL `{d}` as start-of-day UTC",
            );
            let ts = d
                .to_zoned(TimeZone::UTC)
                .expect("civil dates are always representable in UTC")
                .timestamp();
            Occurrence::DateTime(ts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_start(y: i16, m: i8, d: i8) -> Occurrence {
        Occurrence::Date(jiff::civil::date(y, m, d))
    }

    #[test]
    fn interval_non_positive_coerces_to_one() {
        let rule = RRule::builder(Frequency::Daily, date_start(1997, 9, 2))
            .interval(0)
            .build()
            .unwrap();
        assert_eq!(rule.inner.interval, 1);
    }

    #[test]
    fn by_week_no_rejected_outside_yearly() {
        let err = RRule::builder(Frequency::Monthly, date_start(1997, 9, 2))
            .by_week_no([20])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("BYWEEKNO"));
    }

    #[test]
    fn numbered_byday_rejected_at_weekly() {
        let err = RRule::builder(Frequency::Weekly, date_start(1997, 9, 2))
            .by_day([WeekdayNum::nth(-1, Weekday::Friday)])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("numbered BYDAY"));
    }

    #[test]
    fn multi_valued_by_hour_rejected() {
        let err = RRule::builder(Frequency::Daily, date_start(1997, 9, 2))
            .by_hour([9, 10])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("single value"));
    }

    #[test]
    fn by_day_parses_numbered_and_bare() {
        let every: WeekdayNum = "FR".parse().unwrap();
        assert_eq!(every, WeekdayNum::every(Weekday::Friday));
        let last: WeekdayNum = "-1FR".parse().unwrap();
        assert_eq!(last, WeekdayNum::nth(-1, Weekday::Friday));
        let second: WeekdayNum = "2MO".parse().unwrap();
        assert_eq!(second, WeekdayNum::nth(2, Weekday::Monday));
    }
}
