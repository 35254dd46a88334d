use std::collections::BTreeMap;

use laxjson::{json_enum, Codec};
use proptest::prelude::*;
use rust_decimal::Decimal;

json_enum! {
    enum Suit {
        Clubs = 0,
        Diamonds = 1,
        Hearts = 2,
        Spades = 3,
    }
}

fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
        Just(Suit::Hearts),
        Just(Suit::Spades),
    ]
}

proptest! {
    #[test]
    fn i64_round_trips(n in any::<i64>()) {
        let codec = Codec::new();
        let text = codec.serialize(&n).unwrap();
        prop_assert_eq!(codec.deserialize::<i64>(&text).unwrap(), n);
    }

    #[test]
    fn quoted_i32_matches_bare(n in any::<i32>()) {
        let codec = Codec::new();
        let bare = codec.deserialize::<i32>(&n.to_string()).unwrap();
        let quoted = codec.deserialize::<i32>(&format!("\"{n}\"")).unwrap();
        prop_assert_eq!(bare, quoted);
        prop_assert_eq!(bare, n);
    }

    #[test]
    fn finite_f64_round_trips(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let codec = Codec::new();
        let text = codec.serialize(&f).unwrap();
        prop_assert_eq!(codec.deserialize::<f64>(&text).unwrap(), f);
        prop_assert_eq!(codec.deserialize::<f64>(&format!("\"{text}\"")).unwrap(), f);
    }

    #[test]
    fn decimal_round_trips(mantissa in any::<i64>(), scale in 0u32..12) {
        let codec = Codec::new();
        let d = Decimal::new(mantissa, scale);
        let text = codec.serialize(&d).unwrap();
        let back = codec.deserialize::<Decimal>(&text).unwrap();
        prop_assert_eq!(back, d);
        prop_assert_eq!(back.scale(), d.scale());
    }

    #[test]
    fn long_keyed_maps_round_trip(map in prop::collection::btree_map(any::<i64>(), ".*", 0..8)) {
        let codec = Codec::new();
        let text = codec.serialize(&map).unwrap();
        prop_assert_eq!(codec.deserialize::<BTreeMap<i64, String>>(&text).unwrap(), map);
    }

    #[test]
    fn nested_enum_keyed_maps_round_trip(
        map in prop::collection::btree_map(
            any::<i32>(),
            prop::collection::btree_map(suit(), any::<i64>(), 0..4),
            0..6,
        )
    ) {
        let codec = Codec::new();
        let text = codec.serialize(&map).unwrap();
        prop_assert_eq!(
            codec.deserialize::<BTreeMap<i32, BTreeMap<Suit, i64>>>(&text).unwrap(),
            map
        );
    }
}
