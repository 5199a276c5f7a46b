//! The content-line contract of spec.md §6: unfolds RFC 5545 lines, picks out
//! `RRULE`/`EXRULE`/`RDATE`/`EXDATE` lines, and parses each into the types the
//! rest of the crate works with.

use jiff::civil::DateTime;
use jiff::tz::TimeZone;

use crate::occurrence::Occurrence;
use crate::rule::{RRule, WeekdayNum};

/// The parsed contents of a single RRULE/EXRULE/RDATE/EXDATE content block.
#[derive(Default)]
pub(crate) struct ParsedBlock {
    pub rrules: Vec<RRule>,
    pub exrules: Vec<RRule>,
    pub rdates: Vec<Occurrence>,
    pub exdates: Vec<Occurrence>,
}

/// Un-folds continuation lines (a line starting with a space or tab is a
/// continuation of the previous one) and normalizes CRLF/LF, per RFC 5545
/// §3.1's line-folding rule.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if raw.is_empty() && lines.is_empty() {
            continue;
        }
        lines.push(raw.to_string());
    }
    lines
}

/// Parses every content line in `text`, folding the results into a single
/// [`ParsedBlock`].
///
/// In strict mode, any unparseable line aborts the whole block; in lenient
/// mode (the default spec.md §7 posture) it is logged and dropped.
pub(crate) fn parse_block(
    text: &str,
    dt_start: Occurrence,
    time_zone: &TimeZone,
    strict: bool,
) -> anyhow::Result<ParsedBlock> {
    let mut block = ParsedBlock::default();
    for line in unfold_lines(text) {
        if line.is_empty() {
            continue;
        }
        match parse_line(&line, dt_start, time_zone, &mut block) {
            Ok(()) => {}
            Err(e) if strict => return Err(e.context(format!("in content line `{line}`"))),
            Err(e) => log::warn!("skipping unparseable content line `{line}`: {e:#}"),
        }
    }
    Ok(block)
}

fn parse_line(
    line: &str,
    dt_start: Occurrence,
    time_zone: &TimeZone,
    block: &mut ParsedBlock,
) -> anyhow::Result<()> {
    let name_end = line
        .find([':', ';'])
        .ok_or_else(|| anyhow::anyhow!("content line has no `:` or `;`"))?;
    let name = line[..name_end].to_ascii_uppercase();
    let value_start = line
        .rfind(':')
        .ok_or_else(|| anyhow::anyhow!("content line has no value (missing `:`)"))?;
    let value = &line[value_start + 1..];

    match name.as_str() {
        "RRULE" => block.rrules.push(parse_rrule(value, dt_start, time_zone)?),
        "EXRULE" => block.exrules.push(parse_rrule(value, dt_start, time_zone)?),
        "RDATE" => block.rdates.extend(parse_date_list(value, time_zone)?),
        "EXDATE" => block.exdates.extend(parse_date_list(value, time_zone)?),
        other => anyhow::bail!("unrecognized content line prefix `{other}`"),
    }
    Ok(())
}

fn parse_rrule(value: &str, dt_start: Occurrence, time_zone: &TimeZone) -> anyhow::Result<RRule> {
    let mut freq = None;
    let mut builder_parts: Vec<(&str, &str)> = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, val) = part
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("malformed RRULE part `{part}` (expected KEY=VALUE)"))?;
        if key.eq_ignore_ascii_case("FREQ") {
            freq = Some(val.parse()?);
        } else {
            builder_parts.push((key, val));
        }
    }
    let freq = freq.ok_or_else(|| anyhow::anyhow!("RRULE is missing a FREQ part"))?;

    let mut builder = RRule::builder(freq, dt_start);
    builder.time_zone(time_zone.clone());

    for (key, val) in builder_parts {
        match key.to_ascii_uppercase().as_str() {
            "INTERVAL" => {
                builder.interval(val.parse().map_err(|_| anyhow::anyhow!("invalid INTERVAL value `{val}`"))?);
            }
            "COUNT" => {
                builder.count(val.parse().map_err(|_| anyhow::anyhow!("invalid COUNT value `{val}`"))?);
            }
            "UNTIL" => {
                builder.until(parse_date_or_datetime(val, time_zone)?);
            }
            "WKST" => {
                builder.week_start(val.parse::<WeekdayNum>()?.weekday);
            }
            "BYMONTH" => {
                builder.by_month(parse_int_list(val)?);
            }
            "BYWEEKNO" => {
                builder.by_week_no(parse_int_list(val)?);
            }
            "BYYEARDAY" => {
                builder.by_year_day(parse_int_list(val)?);
            }
            "BYMONTHDAY" => {
                builder.by_month_day(parse_int_list(val)?);
            }
            "BYDAY" => {
                let days = val
                    .split(',')
                    .map(|s| s.trim().parse::<WeekdayNum>())
                    .collect::<anyhow::Result<Vec<_>>>()?;
                builder.by_day(days);
            }
            "BYHOUR" => {
                builder.by_hour(parse_int_list(val)?);
            }
            "BYMINUTE" => {
                builder.by_minute(parse_int_list(val)?);
            }
            "BYSECOND" => {
                builder.by_second(parse_int_list(val)?);
            }
            "BYSETPOS" => {
                builder.by_set_pos(parse_int_list(val)?);
            }
            other => anyhow::bail!("unrecognized RRULE part `{other}`"),
        }
    }
    builder.build()
}

fn parse_int_list<T>(val: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.split(',')
        .map(|s| {
            s.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid integer value `{s}`: {e}"))
        })
        .collect()
}

fn parse_date_list(value: &str, time_zone: &TimeZone) -> anyhow::Result<Vec<Occurrence>> {
    value.split(',').map(|s| parse_date_or_datetime(s.trim(), time_zone)).collect()
}

/// Parses a single RFC 5545 DATE or DATE-TIME value: `YYYYMMDD` or
/// `YYYYMMDDTHHMMSS[Z]`. The PERIOD form (`.../...` or `.../P...`) is out of
/// scope (spec.md's Non-goals) and is rejected here.
fn parse_date_or_datetime(val: &str, time_zone: &TimeZone) -> anyhow::Result<Occurrence> {
    anyhow::ensure!(!val.contains('/'), "PERIOD-form values are not supported: `{val}`");

    if val.len() == 8 && val.bytes().all(|b| b.is_ascii_digit()) {
        let year: i16 = val[0..4].parse()?;
        let month: i8 = val[4..6].parse()?;
        let day: i8 = val[6..8].parse()?;
        let date = jiff::civil::Date::new(year, month, day)?;
        return Ok(Occurrence::Date(date));
    }

    let (body, is_utc) = match val.strip_suffix('Z') {
        Some(b) => (b, true),
        None => (val, false),
    };
    anyhow::ensure!(body.len() == 15 && body.as_bytes()[8] == b'T', "invalid DATE-TIME value: `{val}`");
    let year: i16 = body[0..4].parse()?;
    let month: i8 = body[4..6].parse()?;
    let day: i8 = body[6..8].parse()?;
    let hour: i8 = body[9..11].parse()?;
    let minute: i8 = body[11..13].parse()?;
    let second: i8 = body[13..15].parse()?;
    let dt = DateTime::new(year, month, day, hour, minute, second, 0)?;

    if is_utc {
        Ok(Occurrence::DateTime(jiff::tz::Offset::UTC.to_timestamp(dt)?))
    } else {
        let ts = Occurrence::timed_unambiguous(dt, time_zone)
            .ok_or_else(|| anyhow::anyhow!("DATE-TIME `{val}` falls in a DST gap in this time zone"))?;
        Ok(Occurrence::DateTime(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Frequency;

    fn dt_start() -> Occurrence {
        Occurrence::Date(jiff::civil::date(1997, 9, 2))
    }

    #[test]
    fn unfold_joins_continuation_lines() {
        let lines = unfold_lines("RRULE:FREQ=DAILY;\n COUNT=5\nEXDATE:19970904");
        assert_eq!(lines, vec!["RRULE:FREQ=DAILY; COUNT=5".to_string(), "EXDATE:19970904".to_string()]);
    }

    #[test]
    fn parses_simple_rrule_block() {
        let block = parse_block("RRULE:FREQ=DAILY;COUNT=5\nEXDATE:19970904", dt_start(), &TimeZone::UTC, true).unwrap();
        assert_eq!(block.rrules.len(), 1);
        assert_eq!(block.rrules[0].frequency(), Frequency::Daily);
        assert_eq!(block.exdates, vec![Occurrence::Date(jiff::civil::date(1997, 9, 4))]);
    }

    #[test]
    fn lenient_mode_skips_bad_lines() {
        let block = parse_block("RRULE:FREQ=DAILY;COUNT=5\nBOGUS:nope", dt_start(), &TimeZone::UTC, false).unwrap();
        assert_eq!(block.rrules.len(), 1);
    }

    #[test]
    fn strict_mode_rejects_bad_lines() {
        let err = parse_block("BOGUS:nope", dt_start(), &TimeZone::UTC, true).unwrap_err();
        assert!(err.to_string().contains("content line"));
    }

    #[test]
    fn parses_utc_datetime_value() {
        let v = parse_date_or_datetime("19970902T090000Z", &TimeZone::UTC).unwrap();
        match v {
            Occurrence::DateTime(ts) => assert_eq!(ts.to_zoned(TimeZone::UTC).date(), jiff::civil::date(1997, 9, 2)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn rejects_period_form() {
        assert!(parse_date_or_datetime("19970902T090000Z/P1D", &TimeZone::UTC).is_err());
    }

    #[test]
    fn rejects_out_of_range_date_value_instead_of_panicking() {
        assert!(parse_date_or_datetime("19970230", &TimeZone::UTC).is_err());
        assert!(parse_date_or_datetime("99991301", &TimeZone::UTC).is_err());
    }
}
