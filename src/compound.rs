//! The streaming k-way merge-and-subtract of spec.md §4.6: unions several
//! inclusion streams and removes anything any exclusion stream also emits,
//! emitting each surviving occurrence exactly once.

use crate::datelist_iter::DateListIter;
use crate::occurrence::Occurrence;
use crate::rrule_iter::RRuleIter;

/// One contributing stream to a [`CompoundIter`]: either a single RRULE's
/// expansion or an explicit RDATE/EXDATE list.
pub enum Source {
    Rule(RRuleIter),
    List(DateListIter),
}

impl Source {
    fn peek(&mut self) -> Option<Occurrence> {
        match self {
            Source::Rule(it) => it.peek(),
            Source::List(it) => it.peek(),
        }
    }

    fn next(&mut self) -> Option<Occurrence> {
        match self {
            Source::Rule(it) => it.next(),
            Source::List(it) => it.next(),
        }
    }

    fn advance_to(&mut self, target: Occurrence) {
        match self {
            Source::Rule(it) => it.advance_to(target),
            Source::List(it) => it.advance_to(target),
        }
    }
}

/// The union of `included` minus `excluded`, per spec.md §4.6's algorithm
/// and §6's `join`/`except` set-operator surface.
///
/// Cross-type rule: a `Occurrence::Date` and an `Occurrence::DateTime`
/// sharing the same year-month-day never compare equal (see
/// `crate::occurrence::Occurrence`'s `PartialEq`), so they never merge and
/// never exclude one another, matching spec.md §4.6/§8's type-discipline
/// property.
pub struct CompoundIter {
    included: Vec<Source>,
    excluded: Vec<Source>,
    pending: Option<Occurrence>,
}

impl CompoundIter {
    /// The union of `iters`, with no exclusions.
    pub fn join(iters: Vec<Source>) -> CompoundIter {
        CompoundIter::except(iters, Vec::new())
    }

    /// The union of `included` minus the union of `excluded`.
    pub fn except(included: Vec<Source>, excluded: Vec<Source>) -> CompoundIter {
        CompoundIter { included, excluded, pending: None }
    }

    /// Computes `pending` if absent, per spec.md §4.6's five-step algorithm.
    fn fill(&mut self) {
        if self.pending.is_some() {
            return;
        }
        loop {
            let mut min: Option<Occurrence> = None;
            for src in self.included.iter_mut() {
                if let Some(h) = src.peek() {
                    min = Some(match min {
                        Some(m) if m <= h => m,
                        _ => h,
                    });
                }
            }
            let Some(h) = min else { return };

            // Advance every included source whose head equals h (collapsing
            // duplicates across rules/date-lists into one emission).
            for src in self.included.iter_mut() {
                if src.peek() == Some(h) {
                    src.next();
                }
            }
            // Advance every excluded source whose head is strictly behind h;
            // it can never again matter.
            for src in self.excluded.iter_mut() {
                while src.peek().is_some_and(|v| v < h) {
                    src.next();
                }
            }
            // If any excluded source's head equals h, h is excluded: discard
            // it and loop for the next candidate.
            if self.excluded.iter_mut().any(|src| src.peek() == Some(h)) {
                continue;
            }

            self.pending = Some(h);
            return;
        }
    }

    /// Returns whether a further occurrence exists without consuming it.
    pub fn has_next(&mut self) -> bool {
        self.fill();
        self.pending.is_some()
    }

    /// Emits and consumes the next occurrence.
    pub fn next(&mut self) -> Option<Occurrence> {
        self.fill();
        self.pending.take()
    }

    /// Fast-forwards every contributing stream so the next `next()` call
    /// returns the first surviving occurrence `>= target`.
    pub fn advance_to(&mut self, target: Occurrence) {
        for src in self.included.iter_mut() {
            src.advance_to(target);
        }
        for src in self.excluded.iter_mut() {
            src.advance_to(target);
        }
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Frequency, RRule};

    fn d(y: i16, m: i8, day: i8) -> Occurrence {
        Occurrence::Date(jiff::civil::date(y, m, day))
    }

    fn rule_source(rule: &RRule) -> Source {
        Source::Rule(crate::factory::build_iter(rule))
    }

    #[test]
    fn s5_daily_count_minus_exdate() {
        let dt_start = d(1997, 9, 2);
        let rule = RRule::builder(Frequency::Daily, dt_start).count(5).build().unwrap();
        let included = vec![Source::List(DateListIter::singleton(dt_start)), rule_source(&rule)];
        let excluded = vec![Source::List(DateListIter::new(vec![d(1997, 9, 4)]))];
        let mut iter = CompoundIter::except(included, excluded);
        let mut got = Vec::new();
        while let Some(o) = iter.next() {
            got.push(o);
        }
        assert_eq!(got, vec![d(1997, 9, 2), d(1997, 9, 3), d(1997, 9, 5), d(1997, 9, 6)]);
    }

    #[test]
    fn join_dedups_identical_occurrences_across_sources() {
        let dt_start = d(1997, 9, 2);
        let rule = RRule::builder(Frequency::Daily, dt_start).count(3).build().unwrap();
        let iters = vec![
            Source::List(DateListIter::singleton(dt_start)),
            rule_source(&rule),
            Source::List(DateListIter::new(vec![d(1997, 9, 2), d(1997, 9, 10)])),
        ];
        let mut iter = CompoundIter::join(iters);
        let mut got = Vec::new();
        while let Some(o) = iter.next() {
            got.push(o);
        }
        assert_eq!(got, vec![d(1997, 9, 2), d(1997, 9, 3), d(1997, 9, 4), d(1997, 9, 10)]);
    }

    #[test]
    fn cross_type_exclusion_does_not_match() {
        let dt_start_date = jiff::civil::date(1997, 9, 2);
        let timed = Occurrence::DateTime(
            dt_start_date.to_zoned(jiff::tz::TimeZone::UTC).unwrap().timestamp(),
        );
        let included = vec![Source::List(DateListIter::singleton(timed))];
        let excluded = vec![Source::List(DateListIter::singleton(Occurrence::Date(dt_start_date)))];
        let mut iter = CompoundIter::except(included, excluded);
        assert_eq!(iter.next(), Some(timed));
    }

    #[test]
    fn advance_to_matches_repeated_next() {
        let dt_start = d(1997, 9, 2);
        let rule = RRule::builder(Frequency::Daily, dt_start).count(10).build().unwrap();
        let mut a = CompoundIter::join(vec![Source::List(DateListIter::singleton(dt_start)), rule_source(&rule)]);
        let mut b = CompoundIter::join(vec![
            Source::List(DateListIter::singleton(dt_start)),
            rule_source(&RRule::builder(Frequency::Daily, dt_start).count(10).build().unwrap()),
        ]);
        let target = d(1997, 9, 6);
        a.advance_to(target);
        while let Some(v) = b.next() {
            if v >= target {
                assert_eq!(a.next(), Some(v));
                break;
            }
        }
    }
}
