//! Property tests for `Accept` negotiation.
//!
//! Invariants tested:
//! - A supported type is always selected
//! - The selected type has the highest weight the client gave any
//!   supported type, ties going to the earlier one
//! - With nothing acceptable, the first supported type is used

use interpose_rest::{negotiate, MediaType};
use proptest::prelude::*;

const POOL: &[&str] = &[
    "application/json",
    "application/xml",
    "text/xml",
    "application/yaml",
    "text/yaml",
    "image/png",
    "text/html",
];

fn arb_accept() -> impl Strategy<Value = Vec<(&'static str, String)>> {
    prop::collection::vec(
        (prop::sample::select(POOL), (0u8..=10).prop_map(|q| format!("{}.{}", q / 10, q % 10))),
        0..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn picks_the_heaviest_supported_type(ranges in arb_accept()) {
        let supported = MediaType::defaults();
        let header = ranges
            .iter()
            .map(|(ct, q)| format!("{ct};q={q}"))
            .collect::<Vec<_>>()
            .join(", ");

        let picked = negotiate(Some(&header), &supported).unwrap();
        prop_assert!(picked
            .media_type
            .content_types()
            .iter()
            .any(|ct| ct == picked.content_type));

        let weight_of = |media: &MediaType| -> f32 {
            ranges
                .iter()
                .filter(|(ct, _)| media.content_types().iter().any(|s| s == ct))
                .map(|(_, q)| q.parse::<f32>().unwrap())
                .fold(0.0, f32::max)
        };
        let best = supported
            .iter()
            .fold(None::<(&MediaType, f32)>, |best, media| {
                let w = weight_of(media);
                match best {
                    Some((_, bw)) if bw >= w => best,
                    _ if w > 0.0 => Some((media, w)),
                    _ => best,
                }
            });

        match best {
            Some((media, weight)) => {
                prop_assert_eq!(picked.media_type, media);
                prop_assert_eq!(picked.weight, weight);
            }
            None => {
                prop_assert_eq!(picked.media_type.name(), "json");
                prop_assert_eq!(picked.content_type, "application/json");
            }
        }
    }

    #[test]
    fn garbage_headers_still_select(header in "[ -~]{0,40}") {
        let supported = MediaType::defaults();
        prop_assert!(negotiate(Some(&header), &supported).is_some());
    }
}
