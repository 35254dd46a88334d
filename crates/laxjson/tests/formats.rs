use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use laxjson::{Codec, CodecError, CodecOptions, Converter, Culture, FormatOptions, Shape, Typed};

fn instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 12, 1)
        .unwrap()
        .and_hms_opt(2, 3, 4)
        .unwrap()
}

fn christmas() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 12, 25)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn at_offset(hours: i32, dt: NaiveDateTime) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
        .unwrap()
        .from_local_datetime(&dt)
        .unwrap()
}

#[test]
fn default_formats() {
    let codec = Codec::new();
    assert_eq!(codec.serialize(&christmas()).unwrap(), "\"12/25/2019 12:00:00 AM\"");
    let noon = at_offset(-5, christmas() + chrono::Duration::hours(12));
    assert_eq!(codec.serialize(&noon).unwrap(), "\"12/25/2019 12:00:00 PM -05:00\"");
}

#[test]
fn sortable_format_then_reset() {
    let codec = Codec::new();
    codec.set_format_options(&Shape::DateTime, Some("s"), Some(Culture::en_us()));
    assert_eq!(codec.serialize(&instant()).unwrap(), "\"2020-12-01T02:03:04\"");
    assert_eq!(
        codec.deserialize::<NaiveDateTime>("\"2020-12-01T02:03:04\"").unwrap(),
        instant()
    );

    codec.set_format_options(&Shape::DateTime, None, None);
    assert_eq!(codec.serialize(&instant()).unwrap(), "\"12/1/2020 2:03:04 AM\"");
}

#[test]
fn explicit_format_disables_lenient_parsing() {
    let codec = Codec::new();
    assert_eq!(
        codec.deserialize::<NaiveDateTime>("\"12/1/2020 2:03:04 AM\"").unwrap(),
        instant()
    );
    codec.set_format_options(&Shape::DateTime, Some("s"), None);
    let err = codec
        .deserialize::<NaiveDateTime>("\"12/1/2020 2:03:04 AM\"")
        .unwrap_err();
    assert!(matches!(err, CodecError::FormatMismatch { .. }));
}

#[test]
fn universal_format_on_offset_dates() {
    let codec = Codec::new();
    codec.set_format_options(&Shape::DateTimeOffset, Some("u"), None);
    let value = at_offset(5, instant());
    assert_eq!(codec.serialize(&value).unwrap(), "\"2020-11-30 21:03:04Z\"");
}

#[test]
fn exact_offset_format_requires_the_offset() {
    let codec = Codec::new();
    codec.set_format_options(
        &Shape::DateTimeOffset,
        Some("%m/%d/%Y %-H:%M %:z"),
        Some(Culture::en_us()),
    );
    let parsed: DateTime<FixedOffset> = codec.deserialize("\"12/01/2020 2:03 +05:00\"").unwrap();
    assert_eq!(parsed.offset().local_minus_utc(), 5 * 3600);
    assert!(matches!(
        codec.deserialize::<DateTime<FixedOffset>>("\"12/01/2020 2:03\""),
        Err(CodecError::FormatMismatch { .. })
    ));
}

#[test]
fn offset_text_decodes_into_naive_dates() {
    let codec = Codec::new();
    let local: NaiveDateTime = codec.deserialize("\"2020-12-01T02:03:04-08:00\"").unwrap();
    assert_eq!(local, instant());
    let local: NaiveDateTime = codec.deserialize("\"12/25/2019 12:00:00 PM -05:00\"").unwrap();
    assert_eq!(local, christmas() + chrono::Duration::hours(12));
}

#[test]
fn bulk_update_ignores_unregistered_types() {
    let codec = Codec::new();
    let mut entries = HashMap::new();
    entries.insert(Shape::DateTime, FormatOptions::new(Some("%Y/%m/%d"), None));
    entries.insert(Shape::DateTimeOffset, FormatOptions::new(Some("u"), None));
    entries.insert(Shape::Int64, FormatOptions::new(Some("s"), None));
    codec.set_format_options_bulk(entries);

    assert_eq!(codec.serialize(&instant()).unwrap(), "\"2020/12/01\"");
    assert_eq!(
        codec.serialize(&at_offset(0, instant())).unwrap(),
        "\"2020-12-01 02:03:04Z\""
    );
    assert_eq!(codec.serialize(&5i64).unwrap(), "5");
}

#[test]
fn invalid_format_is_reported_on_use() {
    let codec = Codec::new();
    codec.set_format_options(&Shape::DateTime, Some("%Q"), None);
    assert_eq!(
        codec.serialize(&instant()).unwrap_err(),
        CodecError::InvalidFormat { format: "%Q".into() }
    );
}

#[test]
fn format_changes_reach_specialized_maps() {
    let codec = Codec::new();
    let mut map = BTreeMap::new();
    map.insert(1i32, instant());
    assert_eq!(codec.serialize(&map).unwrap(), r#"{"1":"12/1/2020 2:03:04 AM"}"#);
    codec.set_format_options(&Shape::DateTime, Some("s"), None);
    assert_eq!(codec.serialize(&map).unwrap(), r#"{"1":"2020-12-01T02:03:04"}"#);
}

#[test]
fn date_keys_use_the_registered_date_converter() {
    let codec = Codec::new();
    codec.set_format_options(&Shape::DateTime, Some("%Y%m%d"), None);
    let mut map = BTreeMap::new();
    map.insert(christmas(), 1i32);
    let text = codec.serialize(&map).unwrap();
    assert_eq!(text, r#"{"20191225":1}"#);
    assert_eq!(codec.deserialize::<BTreeMap<NaiveDateTime, i32>>(&text).unwrap(), map);
}

#[test]
fn map_converters_keep_the_value_converter_they_were_built_with() {
    let maps = Converter::maps();
    let first = CodecOptions::empty()
        .with_converter(Converter::date_time())
        .with_converter(maps.clone());
    first.resolve(&BTreeMap::<i32, NaiveDateTime>::shape());
    first.resolve(&BTreeMap::<i32, Vec<NaiveDateTime>>::shape());

    let sortable = Converter::date_time();
    if let Some(dates) = sortable.as_formattable() {
        dates.set_format(FormatOptions::new(Some("s"), None));
    }
    let codec = Codec::with_options(CodecOptions::empty().with_converter(sortable).with_converter(maps));

    // Captured at construction: still the first registry's date converter.
    let mut direct = BTreeMap::new();
    direct.insert(1i32, christmas());
    assert_eq!(codec.serialize(&direct).unwrap(), r#"{"1":"12/25/2019 12:00:00 AM"}"#);

    // Sequences have no converter of their own, so their items resolve
    // against the registry in use.
    let mut nested = BTreeMap::new();
    nested.insert(1i32, vec![christmas()]);
    assert_eq!(codec.serialize(&nested).unwrap(), r#"{"1":["2019-12-25T00:00:00"]}"#);

    assert_eq!(codec.serialize(&christmas()).unwrap(), "\"2019-12-25T00:00:00\"");
}

#[test]
fn detached_options_scope_format_changes() {
    let codec = Codec::new();
    let scoped = Codec::with_options(codec.options().detached());
    scoped.set_format_options(&Shape::DateTime, Some("s"), None);
    assert_eq!(scoped.serialize(&instant()).unwrap(), "\"2020-12-01T02:03:04\"");
    assert_eq!(codec.serialize(&instant()).unwrap(), "\"12/1/2020 2:03:04 AM\"");
}

#[test]
fn provider_changes_the_culture_patterns() {
    let codec = Codec::new();
    codec.set_format_options(&Shape::DateTime, Some("d"), Some(Culture::fr_fr()));
    assert_eq!(codec.serialize(&instant()).unwrap(), "\"01/12/2020\"");
    assert_eq!(
        codec.deserialize::<NaiveDateTime>("\"25/12/2019\"").unwrap(),
        christmas()
    );
}

#[test]
fn format_changes_race_with_encoding_and_decoding() {
    let codec = Codec::new();
    let mut map = BTreeMap::new();
    map.insert(1i32, instant());
    let renderings = [
        r#"{"1":"12/1/2020 2:03:04 AM"}"#,
        r#"{"1":"2020-12-01T02:03:04"}"#,
    ];
    let nested_text = r#"{"1":{"2":"2020-12-01T02:03:04"},"3":{}}"#;

    std::thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(|| {
                for round in 0..200 {
                    if round % 2 == 0 {
                        codec.set_format_options(&Shape::DateTime, Some("s"), None);
                    } else {
                        codec.set_format_options(&Shape::DateTime, None, None);
                    }
                }
            });
        }
        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let text = codec.serialize(&map).unwrap();
                    assert!(renderings.contains(&text.as_str()), "{text}");
                }
            });
        }
        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let nested: BTreeMap<i32, BTreeMap<i64, NaiveDateTime>> =
                        codec.deserialize(nested_text).unwrap();
                    assert_eq!(nested[&1][&2], instant());
                    assert!(nested[&3].is_empty());
                }
            });
        }
    });

    codec.set_format_options(&Shape::DateTime, None, None);
    assert_eq!(codec.serialize(&map).unwrap(), renderings[0]);
}
