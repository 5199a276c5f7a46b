use super::{GeneratorStep, WorkingDate};
use crate::rule::WeekdayNum;

/// Resolves BYDAY against its enclosing period — a calendar month when
/// `year_scoped` is `false` (MONTHLY frequency, or YEARLY with BYMONTH set),
/// or a whole calendar year when `true` (YEARLY with no BYMONTH/BYWEEKNO).
/// Candidates are cached per period the same way `ByMonthDayGenerator`
/// caches per month.
#[derive(Clone, Debug)]
pub struct ByDayGenerator {
    by_day: Box<[WeekdayNum]>,
    year_scoped: bool,
    cached_period: Option<(i16, i8)>,
    candidates: Vec<jiff::civil::Date>,
    idx: usize,
}

impl ByDayGenerator {
    pub fn new(by_day: Box<[WeekdayNum]>, year_scoped: bool) -> ByDayGenerator {
        ByDayGenerator { by_day, year_scoped, cached_period: None, candidates: Vec::new(), idx: 0 }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        let period = if self.year_scoped { (wd.year, 0) } else { (wd.year, wd.month) };
        if self.cached_period != Some(period) {
            self.cached_period = Some(period);
            let (start, end) = if self.year_scoped {
                (jiff::civil::date(wd.year, 1, 1), jiff::civil::date(wd.year, 12, 31))
            } else {
                let first = jiff::civil::date(wd.year, wd.month, 1);
                (first, first.last_of_month())
            };
            self.candidates = super::by_day_candidates(&self.by_day, start, end);
            self.idx = 0;
        }
        match self.candidates.get(self.idx) {
            Some(&date) => {
                wd.month = date.month();
                wd.day = date.day();
                self.idx += 1;
                GeneratorStep::Advanced
            }
            None => GeneratorStep::RolledOver,
        }
    }
}
