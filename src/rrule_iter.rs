//! The front end of a single RRULE: wraps an instance generator with a
//! terminating condition, forced time-of-day, and UTC normalization, and
//! exposes the peek/advance interface the compound iterator drives.

use jiff::civil::Date;
use jiff::{Timestamp, tz::AmbiguousOffset};

use crate::condition::{Condition, ConditionVerdict};
use crate::instance::{BySetPosInstanceGenerator, SerialInstanceGenerator};
use crate::occurrence::Occurrence;
use crate::rule::{ForcedTimeOfDay, RRule};

enum InstanceGen {
    Serial(SerialInstanceGenerator),
    BySetPos(BySetPosInstanceGenerator),
}

impl InstanceGen {
    fn next(&mut self) -> Option<Date> {
        match self {
            InstanceGen::Serial(g) => g.next(),
            InstanceGen::BySetPos(g) => g.next(),
        }
    }
}

/// An iterator over a single RRULE's occurrences, in ascending order.
///
/// Cheap to own in isolation: it holds its own exclusively-owned generator
/// chain (spec.md §5's "exclusively owned tree"), so two `RRuleIter`s built
/// from the same `RRule` never share mutable state.
pub struct RRuleIter {
    rule: RRule,
    instance: InstanceGen,
    condition: Condition,
    /// A second instant queued by a DST fold: RFC 5545 says both wall-clock
    /// matches of a folded local time are real occurrences, so when a
    /// candidate lands in a fold we emit the earlier instant immediately and
    /// hold the later one here for the very next call.
    pending_fold: Option<Timestamp>,
    next_candidate: Option<Occurrence>,
    done: bool,
}

impl RRuleIter {
    pub(crate) fn new(rule: RRule, instance_serial: Option<SerialInstanceGenerator>,
        instance_set_pos: Option<BySetPosInstanceGenerator>, condition: Condition) -> RRuleIter {
        let instance = match (instance_serial, instance_set_pos) {
            (Some(s), None) => InstanceGen::Serial(s),
            (None, Some(b)) => InstanceGen::BySetPos(b),
            _ => unreachable!("factory builds exactly one instance generator kind per rule"),
        };
        RRuleIter { rule, instance, condition, pending_fold: None, next_candidate: None, done: false }
    }

    fn resolve_candidate(&mut self, date: Date) -> Option<Occurrence> {
        match self.rule.dt_start() {
            Occurrence::Date(_) => Some(Occurrence::Date(date)),
            Occurrence::DateTime(start_ts) => {
                let start_zoned = start_ts.to_zoned(self.rule.time_zone().clone());
                let mut dt = start_zoned.datetime().with().date(date).build().ok()?;
                dt = match self.rule.inner.forced_time {
                    Some(ForcedTimeOfDay::Hour(h)) => dt.with().hour(h).build().ok()?,
                    Some(ForcedTimeOfDay::Minute(m)) => dt.with().minute(m).build().ok()?,
                    Some(ForcedTimeOfDay::Second(s)) => dt.with().second(s).build().ok()?,
                    None => dt,
                };
                match self.rule.time_zone().to_ambiguous_zoned(dt).offset() {
                    AmbiguousOffset::Unambiguous { offset } => {
                        offset.to_timestamp(dt).ok().map(Occurrence::DateTime)
                    }
                    AmbiguousOffset::Gap { .. } => None,
                    AmbiguousOffset::Fold { before, after } => {
                        let (before, after) = (before.to_timestamp(dt).ok(), after.to_timestamp(dt).ok());
                        if let Some(after) = after {
                            self.pending_fold = Some(after);
                        }
                        before.map(Occurrence::DateTime)
                    }
                }
            }
        }
    }

    /// Computes `nextCandidate` if absent, per spec.md §4.5's five steps.
    fn fill_next(&mut self) {
        if self.done || self.next_candidate.is_some() {
            return;
        }
        if let Some(ts) = self.pending_fold.take() {
            let occurrence = Occurrence::DateTime(ts);
            match self.condition.check(occurrence) {
                ConditionVerdict::Accept => {
                    self.next_candidate = Some(occurrence);
                    return;
                }
                ConditionVerdict::Stop => {
                    self.done = true;
                    return;
                }
            }
        }
        loop {
            let Some(date) = self.instance.next() else {
                self.done = true;
                return;
            };
            let Some(occurrence) = self.resolve_candidate(date) else {
                // A DST gap: this civil time never happened, skip silently.
                continue;
            };
            match self.condition.check(occurrence) {
                ConditionVerdict::Accept => {
                    self.next_candidate = Some(occurrence);
                    return;
                }
                ConditionVerdict::Stop => {
                    self.done = true;
                    return;
                }
            }
        }
    }

    /// Returns whether a further occurrence exists without consuming it.
    pub fn has_next(&mut self) -> bool {
        self.fill_next();
        self.next_candidate.is_some()
    }

    /// Returns the next occurrence without consuming it.
    pub fn peek(&mut self) -> Option<Occurrence> {
        self.fill_next();
        self.next_candidate
    }

    /// Emits and consumes the next occurrence.
    pub fn next(&mut self) -> Option<Occurrence> {
        self.fill_next();
        self.next_candidate.take()
    }

    /// Fast-forwards so the next `next()` call returns the first occurrence
    /// `>= target`. Always visits every intermediate candidate one at a
    /// time, which keeps a COUNT condition's `emittedCount` truthful in
    /// every case; a rule with no COUNT could in principle jump the
    /// underlying year/month generators straight to `target`'s enclosing
    /// period instead (spec.md §4.5's `canShortcutAdvance`), but that
    /// generator-level seek isn't implemented here, so both cases take the
    /// same conservative path.
    pub fn advance_to(&mut self, target: Occurrence) {
        if self.done {
            return;
        }
        loop {
            self.fill_next();
            match self.next_candidate {
                Some(candidate) if candidate < target => {
                    self.next_candidate = None;
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::rule::Frequency;

    #[test]
    fn daily_count_emits_requested_number() {
        let dt_start = Occurrence::Date(jiff::civil::date(1997, 9, 2));
        let rule = RRule::builder(Frequency::Daily, dt_start).count(3).build().unwrap();
        let mut iter = factory::build_iter(&rule);
        let mut got = Vec::new();
        while let Some(o) = iter.next() {
            got.push(o);
        }
        assert_eq!(
            got,
            vec![
                Occurrence::Date(jiff::civil::date(1997, 9, 2)),
                Occurrence::Date(jiff::civil::date(1997, 9, 3)),
                Occurrence::Date(jiff::civil::date(1997, 9, 4)),
            ]
        );
    }

    #[test]
    fn advance_to_skips_past_target() {
        let dt_start = Occurrence::Date(jiff::civil::date(1997, 9, 2));
        let rule = RRule::builder(Frequency::Daily, dt_start).count(10).build().unwrap();
        let mut iter = factory::build_iter(&rule);
        iter.advance_to(Occurrence::Date(jiff::civil::date(1997, 9, 5)));
        assert_eq!(iter.next(), Some(Occurrence::Date(jiff::civil::date(1997, 9, 5))));
    }
}
