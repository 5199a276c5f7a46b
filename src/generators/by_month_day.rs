use super::{GeneratorStep, WorkingDate};

/// Resolves BYMONTHDAY against the enclosing month, caching the resolved day
/// list for as long as `wd`'s (year, month) doesn't change. Recomputed on
/// demand rather than reset explicitly by the month generator above it: the
/// cache key mismatch after a month rollover is enough to trigger a refresh
/// on the next call.
#[derive(Clone, Debug)]
pub struct ByMonthDayGenerator {
    by_month_day: Box<[i8]>,
    cached_period: Option<(i16, i8)>,
    candidates: Vec<i8>,
    idx: usize,
}

impl ByMonthDayGenerator {
    pub fn new(by_month_day: Box<[i8]>) -> ByMonthDayGenerator {
        ByMonthDayGenerator { by_month_day, cached_period: None, candidates: Vec::new(), idx: 0 }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        let period = (wd.year, wd.month);
        if self.cached_period != Some(period) {
            self.cached_period = Some(period);
            self.candidates = super::by_month_day_candidates(&self.by_month_day, wd.year, wd.month);
            self.idx = 0;
        }
        match self.candidates.get(self.idx) {
            Some(&day) => {
                wd.day = day;
                self.idx += 1;
                GeneratorStep::Advanced
            }
            None => GeneratorStep::RolledOver,
        }
    }
}
