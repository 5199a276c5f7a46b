use jiff::civil::Date;

use super::{GeneratorStep, WorkingDate};

/// Resolves BYYEARDAY against the enclosing year.
#[derive(Clone, Debug)]
pub struct ByYearDayGenerator {
    by_year_day: Box<[i16]>,
    cached_year: Option<i16>,
    candidates: Vec<Date>,
    idx: usize,
}

impl ByYearDayGenerator {
    pub fn new(by_year_day: Box<[i16]>) -> ByYearDayGenerator {
        ByYearDayGenerator { by_year_day, cached_year: None, candidates: Vec::new(), idx: 0 }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        if self.cached_year != Some(wd.year) {
            self.cached_year = Some(wd.year);
            self.candidates = super::by_year_day_candidates(&self.by_year_day, wd.year);
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
    fn negative_and_positive_values_combine_sorted() {
        let mut gen = ByYearDayGenerator::new(vec![1, -1].into_boxed_slice());
        let mut wd = WorkingDate { year: 2024, month: 0, day: 0 };
        assert_eq!(gen.generate(&mut wd), GeneratorStep::Advanced);
        assert_eq!((wd.month, wd.day), (1, 1));
        assert_eq!(gen.generate(&mut wd), GeneratorStep::Advanced);
        assert_eq!((wd.month, wd.day), (12, 31));
        assert_eq!(gen.generate(&mut wd), GeneratorStep::RolledOver);
    }
}
