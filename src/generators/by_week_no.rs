use jiff::civil::Date;

use super::{GeneratorStep, WorkingDate};
use crate::rule::Weekday;

/// Resolves BYWEEKNO against the enclosing year (YEARLY frequency only —
/// `RRuleBuilder::build` rejects BYWEEKNO at any other frequency).
#[derive(Clone, Debug)]
pub struct ByWeekNoGenerator {
    by_week_no: Box<[i8]>,
    wkst: Weekday,
    cached_year: Option<i16>,
    candidates: Vec<Date>,
    idx: usize,
}

impl ByWeekNoGenerator {
    pub fn new(by_week_no: Box<[i8]>, wkst: Weekday) -> ByWeekNoGenerator {
        ByWeekNoGenerator { by_week_no, wkst, cached_year: None, candidates: Vec::new(), idx: 0 }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        if self.cached_year != Some(wd.year) {
            self.cached_year = Some(wd.year);
            self.candidates = super::by_week_no_candidates(&self.by_week_no, self.wkst, wd.year);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_one_yields_seven_consecutive_days() {
        let mut gen = ByWeekNoGenerator::new(vec![1].into_boxed_slice(), Weekday::Monday);
        let mut wd = WorkingDate { year: 1997, month: 0, day: 0 };
        let mut dates = Vec::new();
        loop {
            match gen.generate(&mut wd) {
                GeneratorStep::Advanced => dates.push(wd.date()),
                GeneratorStep::RolledOver => break,
            }
        }
        assert_eq!(dates.len(), 7);
        assert!(dates.windows(2).all(|w| w[1] == w[0].tomorrow().unwrap()));
    }
}
