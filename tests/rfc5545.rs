//! Acceptance tests for the worked RFC 5545 examples (the analog of `biff`'s
//! own `tests/time/seq.rs`): each test builds a rule or content-line block
//! and checks the exact sequence of occurrences it produces.

use jiff::civil::date;
use jiff::tz::TimeZone;

use recurrence_engine::{create_iterator, Occurrence};

fn d(y: i16, m: i8, day: i8) -> Occurrence {
    Occurrence::Date(date(y, m, day))
}

#[test]
fn s1_weekly_on_tuesdays_until() {
    let dt_start = d(1997, 9, 2);
    let mut iter = create_iterator(
        "RRULE:FREQ=WEEKLY;UNTIL=19971007;WKST=SU;BYDAY=TU",
        dt_start,
        TimeZone::UTC,
        true,
    )
    .unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(
        got,
        vec![d(1997, 9, 2), d(1997, 9, 9), d(1997, 9, 16), d(1997, 9, 23), d(1997, 9, 30), d(1997, 10, 7)],
    );
}

#[test]
fn s2_monthly_last_friday_count_via_content_line() {
    let dt_start = d(1997, 9, 5);
    let mut iter = create_iterator(
        "RRULE:FREQ=MONTHLY;COUNT=3;BYDAY=-1FR",
        dt_start,
        TimeZone::UTC,
        true,
    )
    .unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 9, 5), d(1997, 9, 26), d(1997, 10, 31)]);
}

#[test]
fn s3_yearly_by_week_no_and_day() {
    let dt_start = d(1997, 5, 12);
    let mut iter = create_iterator(
        "RRULE:FREQ=YEARLY;COUNT=3;BYWEEKNO=20;BYDAY=MO",
        dt_start,
        TimeZone::UTC,
        true,
    )
    .unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 5, 12), d(1998, 5, 11), d(1999, 5, 17)]);
}

#[test]
fn s4_set_pos_last_workday_of_month() {
    let dt_start = d(1997, 9, 29);
    let mut iter = create_iterator(
        "RRULE:FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
        dt_start,
        TimeZone::UTC,
        true,
    )
    .unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 9, 30), d(1997, 10, 31), d(1997, 11, 28)]);
}

#[test]
fn s5_daily_minus_exdate() {
    let dt_start = d(1997, 9, 2);
    let rdata = "RRULE:FREQ=DAILY;COUNT=5\nEXDATE:19970904";
    let mut iter = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 9, 2), d(1997, 9, 3), d(1997, 9, 5), d(1997, 9, 6)]);
}

#[test]
fn s6_interval_ten_days_crosses_month_boundary() {
    let dt_start = d(1997, 9, 2);
    let mut iter =
        create_iterator("RRULE:FREQ=DAILY;INTERVAL=10;COUNT=4", dt_start, TimeZone::UTC, true).unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 9, 2), d(1997, 9, 12), d(1997, 9, 22), d(1997, 10, 2)]);
}

#[test]
fn rdate_adds_occurrences_outside_the_rule() {
    let dt_start = d(1997, 9, 2);
    let rdata = "RRULE:FREQ=DAILY;COUNT=2\nRDATE:19971225";
    let mut iter = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    assert_eq!(got, vec![d(1997, 9, 2), d(1997, 9, 3), d(1997, 12, 25)]);
}

#[test]
fn exrule_subtracts_a_whole_second_rule() {
    let dt_start = d(1997, 9, 2);
    let rdata = "RRULE:FREQ=DAILY;COUNT=6\nEXRULE:FREQ=WEEKLY;COUNT=1;BYDAY=TU";
    let mut iter = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();
    let mut got = Vec::new();
    while let Some(o) = iter.next() {
        got.push(o);
    }
    // 1997-09-02 is a Tuesday; EXRULE's single WEEKLY/BYDAY=TU occurrence
    // removes only that one day from the DAILY;COUNT=6 run.
    assert_eq!(
        got,
        vec![d(1997, 9, 3), d(1997, 9, 4), d(1997, 9, 5), d(1997, 9, 6), d(1997, 9, 7)],
    );
}

#[test]
fn advance_to_matches_full_iteration() {
    let dt_start = d(1997, 9, 2);
    let rdata = "RRULE:FREQ=DAILY;COUNT=20";
    let mut full = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();
    let mut fast = create_iterator(rdata, dt_start, TimeZone::UTC, true).unwrap();

    let target = d(1997, 9, 15);
    let mut expected = None;
    while let Some(o) = full.next() {
        if o >= target {
            expected = Some(o);
            break;
        }
    }
    fast.advance_to(target);
    assert_eq!(fast.next(), expected);
}
