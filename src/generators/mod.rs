//! Period generators: stateful producers advancing one calendar period at a
//! time, composed bottom-up (day, then month, then year) by the instance
//! generators in `crate::instance`.
//!
//! Each generator mutates one field of a shared [`WorkingDate`] and reports
//! whether it advanced within its enclosing period or rolled over (spec
//! terminology: "rollover"), handing control back to the generator that owns
//! the next-larger period.

mod by_day;
mod by_month_day;
mod by_week_no;
mod by_year_day;
mod month;
mod period;
mod serial_day;
mod year;

pub use by_day::ByDayGenerator;
pub use by_month_day::ByMonthDayGenerator;
pub use by_week_no::ByWeekNoGenerator;
pub use by_year_day::ByYearDayGenerator;
pub use month::{ExplicitMonthGenerator, MonthGenerator, SerialMonthGenerator};
pub(crate) use period::{by_day_candidates, by_month_day_candidates, by_week_no_candidates, by_year_day_candidates};
pub use serial_day::SerialDayGenerator;
pub use year::SerialYearGenerator;

/// The single mutable (year, month, day) triple threaded through a
/// generator chain. Time-of-day is not part of this: it is applied
/// separately by `RRuleIter` once a candidate date has survived all filters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WorkingDate {
    pub year: i16,
    pub month: i8,
    pub day: i8,
}

impl WorkingDate {
    pub fn from_date(date: jiff::civil::Date) -> WorkingDate {
        WorkingDate { year: date.year(), month: date.month(), day: date.day() }
    }

    /// Converts the current field values to a calendar date.
    ///
    /// # Panics
    ///
    /// Panics if the generator chain ever positions this at a day that does
    /// not exist (e.g. day 31 in a month with fewer than 31 days). No
    /// generator in this crate does that: every by-list generator drops
    /// out-of-range candidates before writing them here.
    pub fn date(&self) -> jiff::civil::Date {
        jiff::civil::date(self.year, self.month, self.day)
    }
}

/// The result of asking a generator to advance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeneratorStep {
    /// The generator wrote a new value into its owned field(s) of the
    /// working date.
    Advanced,
    /// The generator has no further values for the current enclosing
    /// period; the caller must advance the enclosing generator first.
    RolledOver,
}

/// The day-selecting generator slot in the factory's dispatch table
/// (spec.md §4.3's "day generator" column).
pub enum DayGenerator {
    Serial(SerialDayGenerator),
    ByMonthDay(ByMonthDayGenerator),
    ByDay(ByDayGenerator),
    ByWeekNo(ByWeekNoGenerator),
    ByYearDay(ByYearDayGenerator),
}

impl DayGenerator {
    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        match self {
            DayGenerator::Serial(g) => g.generate(wd),
            DayGenerator::ByMonthDay(g) => g.generate(wd),
            DayGenerator::ByDay(g) => g.generate(wd),
            DayGenerator::ByWeekNo(g) => g.generate(wd),
            DayGenerator::ByYearDay(g) => g.generate(wd),
        }
    }
}
