use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use proptest::prelude::*;
use resmodel_types::{WireDateTime, date_to_time, epoch, format_time, parse_time};

// ── Epoch / dates ────────────────────────────────────────────────

#[test]
fn epoch_is_unix_zero() {
    assert_eq!(epoch().timestamp(), 0);
    assert_eq!(epoch().offset().local_minus_utc(), 0);
}

#[test]
fn date_to_time_is_midnight_utc() {
    let date = NaiveDate::from_ymd_opt(2008, 10, 12).unwrap();
    let time = date_to_time(date);
    assert_eq!(time, Utc.with_ymd_and_hms(2008, 10, 12, 0, 0, 0).unwrap());
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_rfc3339() {
    let time = parse_time("2007-11-01T15:25:00+02:00").unwrap();
    assert_eq!(time.hour(), 15);
    assert_eq!(time.offset().local_minus_utc(), 7200);
}

#[test]
fn parses_own_display_form() {
    let original = parse_time("2007-11-01T15:25:00-05:00").unwrap();
    let rendered = format_time(&original);
    assert_eq!(rendered, "2007-11-01 15:25:00 -0500");
    assert_eq!(parse_time(&rendered), Some(original));
}

#[test]
fn parses_rfc2822() {
    let time = parse_time("Thu, 01 Nov 2007 15:25:00 +0000").unwrap();
    assert_eq!(time.day(), 1);
    assert_eq!(time.minute(), 25);
}

#[test]
fn zoneless_inputs_are_utc() {
    let expected = Utc.with_ymd_and_hms(2007, 11, 1, 15, 25, 0).unwrap();
    assert_eq!(parse_time("2007-11-01T15:25:00"), Some(expected.fixed_offset()));
    assert_eq!(parse_time("2007-11-01 15:25:00"), Some(expected.fixed_offset()));
}

#[test]
fn parses_bare_date() {
    let time = parse_time("2008-10-12").unwrap();
    assert_eq!(time, Utc.with_ymd_and_hms(2008, 10, 12, 0, 0, 0).unwrap());
}

#[test]
fn rejects_garbage_and_blank() {
    assert_eq!(parse_time(""), None);
    assert_eq!(parse_time("   "), None);
    assert_eq!(parse_time("not a time"), None);
    assert_eq!(parse_time("2008-13-45"), None);
}

// ── WireDateTime ─────────────────────────────────────────────────

#[test]
fn wire_from_components() {
    let wire = WireDateTime::new(2000, 7, 8, 10, 20, 34).unwrap();
    assert_eq!(wire.to_string(), "20000708T10:20:34");
    assert_eq!(
        wire.to_time(),
        Utc.with_ymd_and_hms(2000, 7, 8, 10, 20, 34).unwrap()
    );
}

#[test]
fn wire_rejects_impossible_dates() {
    assert!(WireDateTime::new(2000, 2, 30, 0, 0, 0).is_err());
    assert!(WireDateTime::new(2000, 1, 1, 24, 0, 0).is_err());
}

#[test]
fn wire_parses_both_forms() {
    let compact = WireDateTime::parse("20000708T10:20:34").unwrap();
    let extended = WireDateTime::parse("2000-07-08T10:20:34").unwrap();
    assert_eq!(compact, extended);
    assert!(WireDateTime::parse("yesterday").is_err());
}

#[test]
fn wire_serde_uses_compact_string() {
    let wire = WireDateTime::new(2000, 7, 8, 10, 20, 34).unwrap();
    let json = serde_json::to_string(&wire).unwrap();
    assert_eq!(json, "\"20000708T10:20:34\"");
    let back: WireDateTime = serde_json::from_str(&json).unwrap();
    assert_eq!(back, wire);
}

// ── Properties ───────────────────────────────────────────────────

fn whole_second_time() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (-2_208_988_800_i64..4_102_444_800, -86_340_i32..86_340).prop_map(|(secs, offset)| {
        let offset = FixedOffset::east_opt(offset / 60 * 60).unwrap();
        DateTime::from_timestamp(secs, 0).unwrap().with_timezone(&offset)
    })
}

proptest! {
    #[test]
    fn formatted_time_parses_back(time in whole_second_time()) {
        let parsed = parse_time(&format_time(&time));
        prop_assert_eq!(parsed, Some(time));
        prop_assert_eq!(parsed.map(|t| *t.offset()), Some(*time.offset()));
    }

    #[test]
    fn wire_display_parses_back(secs in 0_i64..4_102_444_800) {
        let naive = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
        let wire = WireDateTime::from(naive);
        prop_assert_eq!(WireDateTime::parse(&wire.to_string()).unwrap(), wire);
    }
}
