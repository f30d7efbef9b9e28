// Unit tests for domain models

use super::*;

#[test]
fn test_timestamp_from_seconds_rounds_to_millis() {
    assert_eq!(Timestamp::from_seconds(1.2345).as_millis(), 1235);
    assert_eq!(Timestamp::from_seconds(0.29).as_millis(), 290);
    assert_eq!(Timestamp::from_seconds(-3.0), Timestamp::ZERO);
    assert_eq!(Timestamp::from_seconds(f64::NAN), Timestamp::ZERO);
}

#[test]
fn test_timestamp_from_components() {
    let time = Timestamp::from_components(1, 2, 3, 456);
    assert_eq!(time.as_millis(), 3_723_456);
}

#[test]
fn test_timestamp_display_and_srt() {
    let time = Timestamp::from_components(1, 2, 3, 456);
    assert_eq!(format!("{}", time), "01:02:03.456");
    assert_eq!(time.format_srt(), "01:02:03,456");
}

#[test]
fn test_timestamp_arithmetic() {
    let a = Timestamp::from_millis(2_500);
    let b = Timestamp::from_millis(1_000);
    assert_eq!(a + b, Timestamp::from_millis(3_500));
    assert_eq!(a - b, Timestamp::from_millis(1_500));
    assert_eq!(b - a, Timestamp::ZERO);

    let total: Timestamp = vec![a, b, b].into_iter().sum();
    assert_eq!(total.as_millis(), 4_500);
}

#[test]
fn test_video_properties_validation() {
    assert!(VideoProperties::new(1080, 1350, 30.0).is_ok());
    assert!(VideoProperties::new(0, 1350, 30.0).is_err());
    assert!(VideoProperties::new(1080, 1350, 0.0).is_err());
    assert!(VideoProperties::new(1080, 1350, f64::NAN).is_err());
}

#[test]
fn test_aspect_ratio_parse() {
    let ratio = AspectRatio::parse("4:5").unwrap();
    assert_eq!(ratio, AspectRatio { width: 4, height: 5 });
    assert!((ratio.as_f64() - 0.8).abs() < f64::EPSILON);
    assert_eq!(ratio.to_string(), "4:5");

    assert!(AspectRatio::parse("4/5").is_err());
    assert!(AspectRatio::parse("0:5").is_err());
    assert!(AspectRatio::parse("a:b").is_err());
}

#[test]
fn test_segment_with_content_keeps_slot() {
    let segment = Segment {
        index: 2,
        start: Timestamp::from_millis(5_000),
        end: Timestamp::from_millis(10_000),
        content: "original",
        cue: Cue::new(
            Timestamp::from_millis(5_200),
            Timestamp::from_millis(10_000),
            "c",
        ),
    };

    let replaced = segment.with_content("replacement");
    assert_eq!(replaced.index, 2);
    assert_eq!(replaced.start, segment.start);
    assert_eq!(replaced.end, segment.end);
    assert_eq!(replaced.duration(), Timestamp::from_millis(5_000));
    assert_eq!(replaced.content, "replacement");
    assert_eq!(replaced.cue, segment.cue);
}

#[test]
fn test_candidate_pools_sizes() {
    let pools: CandidatePools = vec![
        (0, vec![Candidate::new("1/a.mp4"), Candidate::new("1/b.mp4")]),
        (1, vec![Candidate::new("2/a.mp4")]),
    ]
    .into_iter()
    .collect();

    assert_eq!(pools.len(), 2);
    assert_eq!(pools.max_pool_size(), 2);
    assert!(!pools.is_empty());
    assert_eq!(pools.get(1).unwrap()[0].file_name(), "a.mp4");
    assert!(pools.get(5).is_none());
}

#[test]
fn test_pools_with_only_empty_directories_are_empty() {
    let mut pools = CandidatePools::new();
    pools.insert(0, Vec::new());
    assert!(pools.is_empty());
    assert_eq!(pools.max_pool_size(), 0);
}

#[test]
fn test_variant_file_name_is_one_based() {
    assert_eq!(variant_file_name(0), "output_variation_1.mp4");
    assert_eq!(variant_file_name(9), "output_variation_10.mp4");
}
