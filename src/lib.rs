//! A lazy, monotonically-increasing RFC 5545/2445 recurrence expansion
//! engine.
//!
//! Given a validated [`RRule`] (built through [`RRule::builder`], or parsed
//! from RRULE/EXRULE/RDATE/EXDATE content lines via [`create_iterator`]),
//! this crate produces the sequence of [`Occurrence`]s the rule describes:
//! period generators narrow a calendar down to candidate days, filters and
//! BYSETPOS selection trim those candidates, a terminating condition cuts the
//! sequence off, and [`CompoundIter`] merges several such sequences together
//! while subtracting any exclusions.
//!
//! Every iterator type in this crate exposes the same small cursor protocol
//! — `has_next`/`next`/`advance_to` — rather than implementing
//! [`std::iter::Iterator`], so that `advance_to` can skip ahead without
//! materializing every intermediate value.

mod compound;
mod condition;
mod datelist_iter;
mod filters;
mod generators;
mod instance;
mod occurrence;
mod parser;
mod factory;
mod rrule_iter;
mod rule;
mod weekdate;

pub use compound::{CompoundIter, Source};
pub use occurrence::Occurrence;
pub use rrule_iter::RRuleIter;
pub use datelist_iter::DateListIter;
pub use rule::{Frequency, RRule, RRuleBuilder, Weekday, WeekdayNum};

use jiff::tz::TimeZone;

/// Parses `rdata` (one or more RRULE/EXRULE/RDATE/EXDATE content lines) and
/// assembles the compound iterator it describes.
///
/// `dt_start` is always unioned into the inclusion set as its first
/// emission, independent of whether any RRULE or RDATE would independently
/// produce it, per the "DtStart is always included" guarantee. When `strict`
/// is `false`, an unparseable content line is logged and skipped rather than
/// aborting the whole parse.
pub fn create_iterator(
    rdata: &str,
    dt_start: Occurrence,
    time_zone: TimeZone,
    strict: bool,
) -> anyhow::Result<CompoundIter> {
    let block = parser::parse_block(rdata, dt_start, &time_zone, strict)?;

    let mut included: Vec<Source> = vec![Source::List(DateListIter::singleton(dt_start))];
    included.extend(block.rrules.iter().map(|r| Source::Rule(factory::build_iter(r))));
    if !block.rdates.is_empty() {
        included.push(Source::List(DateListIter::new(block.rdates)));
    }

    let mut excluded: Vec<Source> = block.exrules.iter().map(|r| Source::Rule(factory::build_iter(r))).collect();
    if !block.exdates.is_empty() {
        excluded.push(Source::List(DateListIter::new(block.exdates)));
    }

    Ok(CompoundIter::except(included, excluded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_start_is_always_the_first_emission() {
        let dt_start = Occurrence::Date(jiff::civil::date(1997, 9, 2));
        let mut iter =
            create_iterator("RRULE:FREQ=DAILY;COUNT=3", dt_start, TimeZone::UTC, true).unwrap();
        assert_eq!(iter.next(), Some(dt_start));
        assert_eq!(iter.next(), Some(Occurrence::Date(jiff::civil::date(1997, 9, 3))));
        assert_eq!(iter.next(), Some(Occurrence::Date(jiff::civil::date(1997, 9, 4))));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn exdate_removes_a_generated_occurrence() {
        let dt_start = Occurrence::Date(jiff::civil::date(1997, 9, 2));
        let rdata = "RRULE:FREQ=DAILY;COUNT=5\nEXDATE:19970904";
        let mut iter = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();
        let mut got = Vec::new();
        while let Some(o) = iter.next() {
            got.push(o);
        }
        assert_eq!(
            got,
            vec![
                Occurrence::Date(jiff::civil::date(1997, 9, 2)),
                Occurrence::Date(jiff::civil::date(1997, 9, 3)),
                Occurrence::Date(jiff::civil::date(1997, 9, 5)),
                Occurrence::Date(jiff::civil::date(1997, 9, 6)),
            ]
        );
    }

    #[test]
    fn lenient_parse_ignores_unrecognized_lines() {
        let dt_start = Occurrence::Date(jiff::civil::date(1997, 9, 2));
        let rdata = "RRULE:FREQ=DAILY;COUNT=1\nX-SOMETHING:unrecognized";
        assert!(create_iterator(rdata, dt_start, TimeZone::UTC, false).is_ok());
    }
}
