//! The value type emitted by every iterator in this crate.

use jiff::{Timestamp, Zoned, civil::Date, tz::TimeZone};

/// A single occurrence, always normalized to UTC before it is handed to a
/// caller.
///
/// An occurrence is either all-day (a bare calendar date, with no time
/// component at all) or timed (an instant, carried as a UTC timestamp). The
/// two never compare equal to one another, even when they denote the same
/// year-month-day: RFC 5545 treats `DATE` and `DATE-TIME` as distinct value
/// types, and a rule's emissions always match the value type of its DTSTART.
#[derive(Clone, Copy, Debug)]
pub enum Occurrence {
    /// An all-day value: year, month, day only.
    Date(Date),
    /// A timed value, already converted to UTC.
    DateTime(Timestamp),
}

impl Occurrence {
    /// Builds a timed occurrence from a civil datetime in the given zone,
    /// resolving the wall-clock time to a UTC instant.
    ///
    /// Returns `None` when the civil datetime falls in a DST gap (the time
    /// never happened in `zone`), per RFC 5545's instruction to skip such
    /// values. When the datetime falls in a fold (it happened twice), the
    /// earlier of the two instants is returned and the caller is expected to
    /// separately enqueue the later one (see `RRuleIter`'s handling, which is
    /// where that happens).
    pub fn timed_unambiguous(
        dt: jiff::civil::DateTime,
        zone: &TimeZone,
    ) -> Option<Timestamp> {
        use jiff::tz::AmbiguousOffset;
        match zone.to_ambiguous_zoned(dt).offset() {
            AmbiguousOffset::Unambiguous { offset } => {
                offset.to_timestamp(dt).ok()
            }
            AmbiguousOffset::Gap { .. } => None,
            AmbiguousOffset::Fold { before, .. } => before.to_timestamp(dt).ok(),
        }
    }

    /// Returns this occurrence as a zoned datetime in `zone`, for display or
    /// comparison against wall-clock bounds.
    pub fn to_zoned(&self, zone: &TimeZone) -> Zoned {
        match *self {
            Occurrence::Date(d) => d.to_zoned(zone.clone()).expect(
                "civil dates produced by this crate are always representable",
            ),
            Occurrence::DateTime(ts) => ts.to_zoned(zone.clone()),
        }
    }

    /// A total ordering key, comparable across variants: the earliest UTC
    /// instant at which the occurrence could plausibly be said to begin
    /// (midnight UTC for all-day values).
    fn instant_key(&self) -> Timestamp {
        match *self {
            Occurrence::Date(d) => d
                .to_zoned(TimeZone::UTC)
                .expect("civil dates are always representable in UTC")
                .timestamp(),
            Occurrence::DateTime(ts) => ts,
        }
    }

    /// Discriminant used only to keep `Ord` consistent with `PartialEq`: two
    /// occurrences of different variants are never `Eq`, so they must never
    /// compare `Equal` either, even if their `instant_key()`s coincide.
    fn variant_tag(&self) -> u8 {
        match *self {
            Occurrence::Date(_) => 0,
            Occurrence::DateTime(_) => 1,
        }
    }
}

impl PartialEq for Occurrence {
    fn eq(&self, other: &Occurrence) -> bool {
        match (*self, *other) {
            (Occurrence::Date(a), Occurrence::Date(b)) => a == b,
            (Occurrence::DateTime(a), Occurrence::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Occurrence {}

impl PartialOrd for Occurrence {
    fn partial_cmp(&self, other: &Occurrence) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Occurrence {
    fn cmp(&self, other: &Occurrence) -> std::cmp::Ordering {
        (self.instant_key(), self.variant_tag())
            .cmp(&(other.instant_key(), other.variant_tag()))
    }
}

impl std::fmt::Display for Occurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Occurrence::Date(d) => write!(f, "{d}"),
            Occurrence::DateTime(ts) => write!(f, "{ts}"),
        }
    }
}
