//! Terminating conditions: decide whether a candidate occurrence is still
//! within the rule's bounds, and whether the rule is exhausted.

use crate::occurrence::Occurrence;

/// A rule's stopping condition, compiled from its COUNT/UNTIL fields.
#[derive(Clone, Debug)]
pub(crate) enum Condition {
    /// No COUNT, no UNTIL: the rule runs forever (bounded only by the
    /// consecutive-empty-periods guard in `crate::instance`).
    Always,
    /// Stop once `emitted` instances (including DTSTART, if it is unioned
    /// in by the factory) have been produced.
    Count { limit: u32, emitted: u32 },
    /// Stop once a candidate is strictly past `until`. Stored as the same
    /// `Occurrence` variant as DTSTART (see `coerce_until_type`), so a timed
    /// rule's UNTIL is compared at full instant precision rather than
    /// truncated to a calendar date — a rule forcing e.g. BYHOUR=23 can
    /// still be cut off by an UNTIL earlier the same day.
    Until { until: Occurrence },
}

/// What a condition says about one candidate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ConditionVerdict {
    /// The candidate is within bounds; emit it.
    Accept,
    /// The candidate is past the rule's bound; stop iterating, and do not
    /// emit this candidate.
    Stop,
}

impl Condition {
    pub(crate) fn count(limit: u32) -> Condition {
        Condition::Count { limit, emitted: 0 }
    }

    pub(crate) fn until(until: Occurrence) -> Condition {
        Condition::Until { until }
    }

    /// Checks `candidate` (the fully resolved, UTC-normalized occurrence,
    /// after forced time-of-day has been applied) against an UNTIL bound,
    /// and checks COUNT against the running emitted total, incrementing it
    /// on accept.
    pub(crate) fn check(&mut self, candidate: Occurrence) -> ConditionVerdict {
        match self {
            Condition::Always => ConditionVerdict::Accept,
            Condition::Count { limit, emitted } => {
                if *emitted >= *limit {
                    ConditionVerdict::Stop
                } else {
                    *emitted += 1;
                    ConditionVerdict::Accept
                }
            }
            Condition::Until { until } => {
                if candidate > *until { ConditionVerdict::Stop } else { ConditionVerdict::Accept }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_stops_after_limit() {
        let mut cond = Condition::count(2);
        let d = Occurrence::Date(jiff::civil::date(2024, 1, 1));
        assert_eq!(cond.check(d), ConditionVerdict::Accept);
        assert_eq!(cond.check(d), ConditionVerdict::Accept);
        assert_eq!(cond.check(d), ConditionVerdict::Stop);
    }

    #[test]
    fn until_stops_strictly_after_bound() {
        let mut cond = Condition::until(Occurrence::Date(jiff::civil::date(2024, 1, 10)));
        assert_eq!(cond.check(Occurrence::Date(jiff::civil::date(2024, 1, 10))), ConditionVerdict::Accept);
        assert_eq!(cond.check(Occurrence::Date(jiff::civil::date(2024, 1, 11))), ConditionVerdict::Stop);
    }

    #[test]
    fn until_compares_full_instant_for_timed_rules() {
        use jiff::tz::TimeZone;
        let bound = jiff::civil::date(2024, 1, 10)
            .at(23, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
            .timestamp();
        let mut cond = Condition::until(Occurrence::DateTime(bound));
        let earlier = jiff::civil::date(2024, 1, 10)
            .at(9, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
            .timestamp();
        let later_same_day = jiff::civil::date(2024, 1, 10)
            .at(23, 30, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
            .timestamp();
        assert_eq!(cond.check(Occurrence::DateTime(earlier)), ConditionVerdict::Accept);
        assert_eq!(cond.check(Occurrence::DateTime(later_same_day)), ConditionVerdict::Stop);
    }
}
