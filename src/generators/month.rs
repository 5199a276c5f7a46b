use super::{GeneratorStep, WorkingDate};

/// The month-selecting generator slot in the factory's dispatch table.
pub enum MonthGenerator {
    Serial(SerialMonthGenerator),
    Explicit(ExplicitMonthGenerator),
}

impl MonthGenerator {
    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        match self {
            MonthGenerator::Serial(g) => g.generate(wd),
            MonthGenerator::Explicit(g) => g.generate(wd),
        }
    }
}

/// Steps through months `interval` apart, anchored so that `dt_start`'s
/// month is the first one visited in `dt_start`'s year. The stride is
/// tracked as an absolute (year * 12 + zero-based-month) counter so it
/// carries across year boundaries without resetting: for `interval == 1`
/// this simply visits every month of every later year, but for
/// `interval > 1` the phase within a year keeps shifting exactly as it would
/// if the months were numbered consecutively since the beginning of time.
#[derive(Clone, Debug)]
pub struct SerialMonthGenerator {
    interval: i64,
    next_abs: i64,
}

impl SerialMonthGenerator {
    pub fn new(interval: i32, dt_start_year: i16, dt_start_month: i8) -> SerialMonthGenerator {
        let base = i64::from(dt_start_year) * 12 + i64::from(dt_start_month - 1);
        SerialMonthGenerator { interval: i64::from(interval.max(1)), next_abs: base }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        let year = i64::from(wd.year);
        while self.next_abs.div_euclid(12) < year {
            self.next_abs += self.interval;
        }
        if self.next_abs.div_euclid(12) != year {
            return GeneratorStep::RolledOver;
        }
        wd.month = i8::try_from(self.next_abs.rem_euclid(12) + 1).expect("month in 1..=12");
        self.next_abs += self.interval;
        GeneratorStep::Advanced
    }
}

/// Cycles through an explicit, sorted, deduped list of months once per year
/// (used both for BYMONTH and for the YEARLY-frequency "singleton" case of a
/// bare `dt_start.month()`, which the factory represents as a one-element
/// list). Rolls over when the year's list is exhausted.
#[derive(Clone, Debug)]
pub struct ExplicitMonthGenerator {
    months: Box<[i8]>,
    cached_year: Option<i16>,
    idx: usize,
}

impl ExplicitMonthGenerator {
    pub fn new(months: Box<[i8]>) -> ExplicitMonthGenerator {
        ExplicitMonthGenerator { months, cached_year: None, idx: 0 }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        if self.cached_year != Some(wd.year) {
            self.cached_year = Some(wd.year);
            self.idx = 0;
        }
        match self.months.get(self.idx) {
            Some(&month) => {
                wd.month = month;
                self.idx += 1;
                GeneratorStep::Advanced
            }
            None => GeneratorStep::RolledOver,
        }
    }
}
