use super::{GeneratorStep, WorkingDate};

/// Advances `wd.year` by `interval` each call. Per spec.md §4.1, the year
/// generator never rolls over: years are unbounded (the engine's only other
/// stopping conditions are COUNT, UNTIL, and the consecutive-empty-years
/// guard in `crate::instance`).
#[derive(Clone, Debug)]
pub struct SerialYearGenerator {
    interval: i32,
    dt_start_year: i16,
    started: bool,
}

impl SerialYearGenerator {
    pub fn new(interval: i32, dt_start_year: i16) -> SerialYearGenerator {
        SerialYearGenerator { interval, dt_start_year, started: false }
    }

    pub fn generate(&mut self, wd: &mut WorkingDate) -> GeneratorStep {
        if !self.started {
            self.started = true;
            wd.year = self.dt_start_year;
            return GeneratorStep::Advanced;
        }
        match wd.year.checked_add(i16::try_from(self.interval).unwrap_or(i16::MAX)) {
            Some(year) if year <= jiff::civil::Date::MAX.year() => {
                wd.year = year;
                GeneratorStep::Advanced
            }
            _ => GeneratorStep::RolledOver,
        }
    }
}
