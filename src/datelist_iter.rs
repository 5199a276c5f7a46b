//! The trivial iterator over an explicit date/date-time list (spec.md §2
//! item 7, "Date-list iterator"): RDATE and EXDATE without the PERIOD form
//! (the PERIOD form is out of scope — see spec.md's Non-goals).

use crate::occurrence::Occurrence;

/// A sorted, de-duplicated, UTC-normalized sequence of explicit occurrences,
/// exposing the same peek/advance shape as [`crate::rrule_iter::RRuleIter`]
/// so [`crate::compound::CompoundIter`] can drive either uniformly.
pub struct DateListIter {
    values: Vec<Occurrence>,
    idx: usize,
}

impl DateListIter {
    /// Builds an iterator from zero or more occurrences, sorting and
    /// deduplicating them up front.
    pub fn new(mut values: Vec<Occurrence>) -> DateListIter {
        values.sort();
        values.dedup();
        DateListIter { values, idx: 0 }
    }

    /// A one-element list, used to always union DTSTART into the inclusion
    /// set (spec.md §4.5's "Edge cases" / §6's "DtStart is always included"
    /// guarantee).
    pub fn singleton(value: Occurrence) -> DateListIter {
        DateListIter { values: vec![value], idx: 0 }
    }

    pub fn has_next(&mut self) -> bool {
        self.idx < self.values.len()
    }

    pub fn peek(&mut self) -> Option<Occurrence> {
        self.values.get(self.idx).copied()
    }

    pub fn next(&mut self) -> Option<Occurrence> {
        let v = self.peek();
        if v.is_some() {
            self.idx += 1;
        }
        v
    }

    pub fn advance_to(&mut self, target: Occurrence) {
        while self.peek().is_some_and(|v| v < target) {
            self.idx += 1;
        }
    }
}
