// Unit tests for the ffmpeg edit graph

use super::*;
use crate::test_support::{ms, StubProbe};

fn engine() -> FfmpegEngine<StubProbe> {
    FfmpegEngine::new(
        StubProbe::new()
            .with_video("base.mp4", 10_000, 1080, 1350, true)
            .with_video("wide.mp4", 3_000, 1920, 1080, false),
        "ffmpeg",
    )
}

#[test]
fn test_load_uses_probe() {
    let engine = engine();
    let clip = engine.load(Path::new("base.mp4")).unwrap();
    assert_eq!(engine.duration_of(&clip), ms(10_000));
    assert_eq!(engine.properties_of(&clip).width, 1080);
    assert!(clip.has_audio());

    assert!(engine.load(Path::new("nope.mp4")).is_err());
}

#[test]
fn test_subrange_bounds() {
    let engine = engine();
    let clip = engine.load(Path::new("wide.mp4")).unwrap();

    let part = engine.subrange(&clip, ms(500), ms(2_000)).unwrap();
    assert_eq!(part.duration(), ms(1_500));

    assert!(engine.subrange(&clip, ms(3_000), ms(3_500)).is_err());
    assert!(engine.subrange(&clip, ms(2_000), ms(2_000)).is_err());
    assert!(engine.subrange(&clip, ms(0), ms(5_000)).is_err());
    // one frame of overshoot is tolerated
    assert!(engine.subrange(&clip, ms(0), ms(3_020)).is_ok());
}

#[test]
fn test_aspect_crop_matches_centered_crop() {
    let ratio = AspectRatio::new(4, 5).unwrap();

    let wide = aspect_crop(1920, 1080, ratio);
    assert_eq!(wide, Rect { x: 528, y: 0, width: 864, height: 1080 });

    let tall = aspect_crop(1080, 1920, ratio);
    assert_eq!(tall, Rect { x: 0, y: 285, width: 1080, height: 1350 });
}

#[test]
fn test_retiming_tracks_exact_duration() {
    let engine = engine();
    let clip = engine.load(Path::new("wide.mp4")).unwrap();

    let looped = engine.loop_to_duration(&clip, ms(7_250)).unwrap();
    assert_eq!(looped.duration(), ms(7_250));

    let trimmed = engine.trim_to_duration(&clip, ms(1_001)).unwrap();
    assert_eq!(trimmed.duration(), ms(1_001));
    assert!(engine.trim_to_duration(&clip, ms(4_000)).is_err());
}

#[test]
fn test_concatenate_requires_matching_geometry() {
    let engine = engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let wide = engine.load(Path::new("wide.mp4")).unwrap();

    assert!(engine.concatenate(&[base.clone(), wide.clone()]).is_err());

    let scaled = engine.resize(&wide, 1080, 1350).unwrap();
    let joined = engine.concatenate(&[base, scaled]).unwrap();
    assert_eq!(joined.duration(), ms(13_000));
    assert!(engine.concatenate(&[]).is_err());
}

#[test]
fn test_audio_only_from_sources_with_audio() {
    let engine = engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let wide = engine.load(Path::new("wide.mp4")).unwrap();

    assert!(engine.audio_of(&base).is_ok());
    assert!(engine.audio_of(&wide).is_err());
    let part = engine.subrange(&base, ms(0), ms(1_000)).unwrap();
    assert!(engine.audio_of(&part).is_err());
}

#[test]
fn test_compile_full_timeline() {
    let engine = engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let wide = engine.load(Path::new("wide.mp4")).unwrap();
    let style = CaptionStyle::default();

    let first = engine.subrange(&base, ms(0), ms(2_000)).unwrap();

    let replacement = engine
        .crop_to_aspect(&wide, AspectRatio::new(4, 5).unwrap())
        .and_then(|c| engine.loop_to_duration(&c, ms(8_000)))
        .and_then(|c| engine.resample_fps(&c, 30.0))
        .and_then(|c| engine.resize(&c, 1080, 1350))
        .unwrap();
    let caption = engine
        .render_caption("hello world", 1040, &style, ms(8_000), 30.0)
        .unwrap();
    let backing = engine
        .solid_box(1040, 60, "black", 0.7, ms(8_000), 30.0)
        .unwrap();
    let captioned = engine
        .overlay(
            &replacement,
            &[Layer::at(backing, 20, 1250), Layer::at(caption, 20, 1260)],
        )
        .unwrap();

    let video = engine.concatenate(&[first, captioned]).unwrap();
    let audio = engine
        .audio_of(&base)
        .and_then(|a| engine.subrange(&a, ms(0), video.duration()))
        .unwrap();
    let muxed = engine.mux_audio(&video, &audio).unwrap();

    let text_dir = tempfile::tempdir().unwrap();
    let compiled = GraphCompiler::new(text_dir.path()).compile(&muxed).unwrap();

    assert_eq!(
        compiled.inputs,
        vec![PathBuf::from("base.mp4"), PathBuf::from("wide.mp4")]
    );
    let graph = &compiled.filter_complex;
    assert!(graph.contains("[0:v]trim=start=0.000:end=2.000,setpts=PTS-STARTPTS"));
    assert!(graph.contains("[1:v]crop=864:1080:528:0"));
    assert!(graph.contains("loop=loop=-1:size=90:start=0"));
    assert!(graph.contains("trim=duration=8.000"));
    assert!(graph.contains("scale=1080:1350,setsar=1"));
    assert!(graph.contains("color=c=black@0.70:s=1040x60"));
    assert!(graph.contains("drawtext=font='Montserrat-SemiBold'"));
    assert!(graph.contains("concat=n=2:v=1:a=0"));
    assert!(graph.contains("[0:a]atrim=start=0.000:end=10.000,asetpts=PTS-STARTPTS"));
    assert_eq!(compiled.video_label, "outv");
    assert_eq!(compiled.audio_label.as_deref(), Some("outa"));

    // caption text goes through a file, never through the graph string
    assert!(!graph.contains("hello world"));
    let written = std::fs::read_to_string(text_dir.path().join("caption_0.txt")).unwrap();
    assert_eq!(written, "hello world");

    let args = engine.command_args(&compiled, Path::new("out.mp4"), &Codecs::default());
    assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "aac"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn test_compile_video_only_output_drops_audio() {
    let engine = engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let silent = engine.strip_audio(&base).unwrap();
    assert!(!silent.has_audio());

    let text_dir = tempfile::tempdir().unwrap();
    let compiled = GraphCompiler::new(text_dir.path()).compile(&silent).unwrap();
    assert!(compiled.audio_label.is_none());

    let args = engine.command_args(&compiled, Path::new("out.mp4"), &Codecs::default());
    assert!(args.iter().any(|a| a == "-an"));
}

#[test]
fn test_caption_text_is_drawn_verbatim() {
    let engine = engine();
    let base = engine.load(Path::new("base.mp4")).unwrap();
    let style = CaptionStyle::default();
    let text = "100% C:\\x";

    let caption = engine
        .render_caption(text, 1040, &style, ms(10_000), 30.0)
        .unwrap();
    let captioned = engine
        .overlay(&base, &[Layer::at(caption, 20, 1260)])
        .unwrap();

    let text_dir = tempfile::tempdir().unwrap();
    let compiled = GraphCompiler::new(text_dir.path()).compile(&captioned).unwrap();

    let drawtext = compiled
        .filter_complex
        .split(',')
        .find(|f| f.starts_with("drawtext="))
        .unwrap();
    assert!(drawtext.contains(":expansion=none:"));
    let written = std::fs::read_to_string(text_dir.path().join("caption_0.txt")).unwrap();
    assert_eq!(written, text);
}
