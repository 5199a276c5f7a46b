use jiff::ToSpan;
use jiff::civil::Date;

use super::{GeneratorStep, WorkingDate};

/// Steps an absolute calendar-date cursor forward by `step` days at a time
/// (used for DAILY's own interval, and for WEEKLY, where `step` is
/// `interval * 7`). Because the cursor is a real `jiff::civil::Date`, the
/// stride is naturally continuous across month and year boundaries: this
/// generator simply reports `RolledOver` whenever the next value would land
/// outside the month its enclosing generators currently have `wd` pointed
/// at, and the month/year generators above it advance in lockstep until
/// `wd` catches up to where the cursor already is.
#[derive(Clone, Debug)]
pub struct SerialDayGenerator {
    step: i64,
    next: Option<Date>,
}

impl SerialDayGenerator {
    pub fn new(step_days: i64, dt_start_date: Date) -> SerialDayGenerator {
        SerialDayGenerator { step: step_days.max(1), next: Some(dt_start_date) }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        let Some(mut next) = self.next else { return GeneratorStep::RolledOver };
        // A restrictive BYMONTH can hand this generator a period further
        // ahead than its own cursor (the month/year generators above it
        // don't visit every intervening month). Resync forward to the start
        // of the newly-offered period rather than stalling forever waiting
        // for a month that will never come around again.
        if (next.year(), next.month()) < (wd.year, wd.month) {
            next = jiff::civil::date(wd.year, wd.month, 1);
        }
        if next.year() != wd.year || next.month() != wd.month {
            self.next = Some(next);
            return GeneratorStep::RolledOver;
        }
        wd.day = next.day();
        self.next = next.checked_add(self.step.days()).ok();
        GeneratorStep::Advanced
    }
}
