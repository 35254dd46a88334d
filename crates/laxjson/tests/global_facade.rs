//! The process-wide codec. Kept in its own test binary, as a single test,
//! because every step mutates shared state.

use chrono::{NaiveDate, NaiveDateTime};
use laxjson::{CodecOptions, Culture, Shape};

#[test]
fn global_facade_lifecycle() {
    let instant: NaiveDateTime = NaiveDate::from_ymd_opt(2020, 12, 1)
        .unwrap()
        .and_hms_opt(2, 3, 4)
        .unwrap();

    assert_eq!(laxjson::deserialize::<i64>("\"5\"").unwrap(), 5);
    assert_eq!(laxjson::serialize(&instant).unwrap(), "\"12/1/2020 2:03:04 AM\"");

    laxjson::set_format_options(&Shape::DateTime, Some("s"), Some(Culture::en_us()));
    assert_eq!(laxjson::serialize(&instant).unwrap(), "\"2020-12-01T02:03:04\"");
    let shared = laxjson::options();
    let value = laxjson::deserialize_dynamic("\"2020-12-01T02:03:04\"", &Shape::DateTime).unwrap();
    assert_eq!(laxjson::serialize_dynamic(&value, &Shape::DateTime).unwrap(), "\"2020-12-01T02:03:04\"");

    laxjson::set_serializer_options(CodecOptions::new());
    assert_eq!(laxjson::serialize(&instant).unwrap(), "\"12/1/2020 2:03:04 AM\"");
    assert!(!std::sync::Arc::ptr_eq(&shared, &laxjson::options()));

    laxjson::set_format_options_bulk([(Shape::DateTime, laxjson::FormatOptions::new(Some("%Y"), None))].into());
    assert_eq!(laxjson::serialize(&instant).unwrap(), "\"2020\"");
}
