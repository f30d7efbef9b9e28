// Unit tests for segment conforming

use std::path::Path;

use super::*;
use crate::adapters::ffmpeg_engine::{ClipNode, FfmpegEngine, FilterClip};
use crate::test_support::{ms, StubProbe};

struct Fixture {
    engine: Arc<FfmpegEngine<StubProbe>>,
    base: FilterClip,
    props: VideoProperties,
}

fn fixture() -> Fixture {
    let engine = StubProbe::new()
        .with_video("base.mp4", 10_000, 1080, 1350, true)
        .with_video("short.mp4", 1_500, 1920, 1080, false)
        .with_video("long.mp4", 60_000, 720, 900, false)
        .into_engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let props = engine.properties_of(&base);
    Fixture { engine, base, props }
}

impl Fixture {
    fn segment(&self, index: usize, start: u64, end: u64, cue: (u64, u64, &str)) -> Segment<FilterClip> {
        Segment {
            index,
            start: ms(start),
            end: ms(end),
            content: self.engine.subrange(&self.base, ms(start), ms(end)).unwrap(),
            cue: Cue::new(ms(cue.0), ms(cue.1), cue.2),
        }
    }

    fn candidate(&self, path: &str) -> FilterClip {
        let clip = self.engine.load(Path::new(path)).unwrap();
        self.engine
            .crop_to_aspect(&clip, AspectRatio::of(&self.props))
            .unwrap()
    }

    fn conformer(&self) -> SegmentConformer<FfmpegEngine<StubProbe>> {
        SegmentConformer::new(self.engine.clone(), CaptionStyle::default())
    }
}

#[test]
fn test_short_candidate_is_looped_to_slot_length() {
    let f = fixture();
    let target = f.segment(0, 0, 3_000, (0, 3_000, "a"));
    let candidate = f.candidate("short.mp4");

    let conformed = f.conformer().conform(&candidate, &target, &f.props).unwrap();

    assert_eq!(conformed.index, 0);
    assert_eq!(conformed.start, target.start);
    assert_eq!(conformed.end, target.end);
    assert_eq!(f.engine.duration_of(&conformed.content), ms(3_000));
}

#[test]
fn test_overlapping_cue_window_is_trimmed_and_resized() {
    let f = fixture();
    // cue starts before its slot, so the window is longer than the slot
    let target = f.segment(1, 2_000, 5_000, (1_000, 5_000, "b"));
    let candidate = f.candidate("long.mp4");

    let conformed = f.conformer().conform(&candidate, &target, &f.props).unwrap();

    assert_eq!(f.engine.duration_of(&conformed.content), ms(3_000));
    let props = f.engine.properties_of(&conformed.content);
    assert_eq!((props.width, props.height), (1080, 1350));
    assert_eq!(props.fps, 30.0);
}

#[test]
fn test_candidate_ending_before_cue_is_rejected() {
    let f = fixture();
    let target = f.segment(2, 5_000, 10_000, (5_000, 10_000, "c"));
    let candidate = f.candidate("short.mp4");

    let err = f.conformer().conform(&candidate, &target, &f.props).unwrap_err();
    match err {
        CueMixError::ReplacementWindow {
            index,
            cue_start,
            candidate_duration,
        } => {
            assert_eq!(index, 2);
            assert_eq!(cue_start, ms(5_000));
            assert_eq!(candidate_duration, ms(1_500));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cue_start_equal_to_candidate_length_is_rejected() {
    let f = fixture();
    let target = f.segment(0, 0, 3_000, (1_500, 3_000, "x"));
    let candidate = f.candidate("short.mp4");
    let err = f.conformer().conform(&candidate, &target, &f.props).unwrap_err();
    assert!(!err.is_fatal());
}

#[test]
fn test_caption_layers_box_below_text() {
    let f = fixture();
    let target = f.segment(0, 0, 2_000, (0, 2_000, "hello"));
    let candidate = f.candidate("long.mp4");

    let conformed = f.conformer().conform(&candidate, &target, &f.props).unwrap();

    match conformed.content.node() {
        ClipNode::Overlay { layers, .. } => {
            assert_eq!(layers.len(), 2);
            assert!(matches!(layers[0].clip.node(), ClipNode::SolidBox { .. }));
            assert!(matches!(layers[1].clip.node(), ClipNode::Caption { .. }));
            assert!(layers[0].y < layers[1].y);
            assert_eq!(layers[0].clip.duration(), ms(2_000));
        }
        other => panic!("expected an overlay, got {other:?}"),
    }
}

#[test]
fn test_blank_cue_text_skips_caption() {
    let f = fixture();
    let target = f.segment(0, 0, 2_000, (0, 2_000, "   "));
    let candidate = f.candidate("long.mp4");

    let conformed = f.conformer().conform(&candidate, &target, &f.props).unwrap();
    assert!(!matches!(conformed.content.node(), ClipNode::Overlay { .. }));
}
