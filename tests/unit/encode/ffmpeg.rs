use super::*;
use crate::encode::sink::AudioInputConfig;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    }
}

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let dir = std::env::temp_dir().join("wavelock_ffmpeg_odd");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.join("out.mp4")));
    let err = sink.begin(cfg(641, 360)).unwrap_err();
    assert_eq!(err.config_field(), Some("render"));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameBgra {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(WavelockError::Sink(_))
    ));
}

#[test]
fn command_streams_bgra_and_muxes_master_audio() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out.mp4"));
    let mut c = cfg(640, 360);
    let plain = args(&sink.command(&c));
    assert!(plain.windows(2).any(|w| w == ["-pix_fmt", "bgra"]));
    assert!(plain.windows(2).any(|w| w == ["-s", "640x360"]));
    assert!(plain.windows(2).any(|w| w == ["-r", "30/1"]));
    assert!(plain.contains(&"-an".to_string()));

    c.audio = Some(AudioInputConfig {
        path: PathBuf::from("master.flac"),
        start_secs: 1.5,
    });
    let muxed = args(&sink.command(&c));
    assert!(muxed.windows(2).any(|w| w == ["-i", "master.flac"]));
    assert!(muxed.windows(2).any(|w| w == ["-ss", "1.500000"]));
    assert!(!muxed.contains(&"-an".to_string()));
    assert_eq!(muxed.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let root = std::env::temp_dir().join(format!("wavelock_parent_{}", std::process::id()));
    let out = root.join("a").join("b").join("out.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(root.join("a").join("b").is_dir());
    let _ = std::fs::remove_dir_all(&root);
}
