use super::*;
use crate::encode::sink::InMemorySink;
use crate::trigger::{TriggerConfig, TriggerKind};

const SR: u32 = 8_000;

fn sine(period: f64, secs: f64) -> SampleSource {
    let n = (f64::from(SR) * secs) as usize;
    let samples = (0..n)
        .map(|i| (std::f64::consts::TAU * (i as f64 + 0.5) / period).sin() as f32 * 0.8)
        .collect();
    SampleSource::from_mono(samples, SR).unwrap()
}

fn small_config(channels: usize) -> SessionConfig {
    let mut cfg = SessionConfig::from_channel_paths((0..channels).map(|i| format!("{i}.wav")));
    cfg.fps = 30;
    cfg.render.width = 64;
    cfg.render.height = 36;
    cfg.render.antialiasing = false;
    cfg.render.line_width = 1.0;
    cfg
}

#[derive(Default)]
struct FailingSink {
    fail_at: u64,
    pushed: Vec<u64>,
    ended: bool,
    aborted: bool,
    cancel: Option<(u64, CancelToken)>,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> WavelockResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameBgra) -> WavelockResult<()> {
        if idx.0 == self.fail_at {
            return Err(WavelockError::sink("encoder pipe closed"));
        }
        self.pushed.push(idx.0);
        if let Some((at, token)) = &self.cancel
            && *at == idx.0
        {
            token.cancel();
        }
        Ok(())
    }

    fn end(&mut self) -> WavelockResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn frame_count_covers_longest_channel_from_begin_time() {
    let cfg = small_config(2);
    let session = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0), sine(50.0, 0.5)])
        .unwrap();
    assert_eq!(session.frames().len_frames(), 30);

    let mut cfg = small_config(1);
    cfg.begin_time = 0.5;
    let session = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0)]).unwrap();
    assert_eq!(session.frames().len_frames(), 15);
    assert!((session.frame_time(FrameIndex(3)) - 0.6).abs() < 1e-12);

    cfg.end_time = Some(0.6);
    let session = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0)]).unwrap();
    assert_eq!(session.frames().len_frames(), 3);
}

#[test]
fn begin_past_audio_end_is_a_config_error() {
    let mut cfg = small_config(1);
    cfg.begin_time = 2.0;
    let err = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0)])
        .err()
        .unwrap();
    assert_eq!(err.config_field(), Some("begin_time"));
}

#[test]
fn source_count_must_match_channels() {
    let cfg = small_config(2);
    let err = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0)])
        .err()
        .unwrap();
    assert_eq!(err.config_field(), Some("channels"));
}

#[test]
fn zero_length_trigger_window_is_rejected() {
    let mut cfg = small_config(1);
    cfg.trigger_ms = 0.01;
    let err = RenderSession::from_sources(&cfg, vec![sine(40.0, 1.0)])
        .err()
        .unwrap();
    assert_eq!(err.config_field(), Some("trigger_ms"));
}

#[test]
fn frames_reach_sink_in_order_and_sink_is_ended() {
    let cfg = small_config(3);
    let session = RenderSession::from_sources(
        &cfg,
        vec![sine(40.0, 0.5), sine(55.0, 0.5), sine(70.0, 0.5)],
    )
    .unwrap();
    let mut sink = InMemorySink::new();
    let stats = session
        .render_to_sink(&mut sink, &CancelToken::new())
        .unwrap();

    assert_eq!(stats.frames_total, 15);
    assert_eq!(stats.frames_rendered, 15);
    assert!(sink.is_finished());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..15).collect::<Vec<_>>());
    assert_eq!(sink.config().unwrap().fps, Fps::new(30, 1).unwrap());
}

#[test]
fn parallel_channels_match_serial_output() {
    let cfg = small_config(4);
    let sources = || {
        vec![
            sine(40.0, 0.5),
            sine(55.0, 0.5),
            sine(70.0, 0.5),
            sine(33.0, 0.5),
        ]
    };

    let mut serial = InMemorySink::new();
    RenderSession::from_sources(&cfg, sources())
        .unwrap()
        .render_to_sink(&mut serial, &CancelToken::new())
        .unwrap();

    let mut parallel = InMemorySink::new();
    RenderSession::from_sources(&cfg, sources())
        .unwrap()
        .with_threading(RenderThreading {
            parallel: true,
            threads: Some(2),
        })
        .unwrap()
        .render_to_sink(&mut parallel, &CancelToken::new())
        .unwrap();

    assert_eq!(serial.frames(), parallel.frames());
}

#[test]
fn zero_threads_is_rejected() {
    let cfg = small_config(1);
    let err = RenderSession::from_sources(&cfg, vec![sine(40.0, 0.5)])
        .unwrap()
        .with_threading(RenderThreading {
            parallel: true,
            threads: Some(0),
        })
        .err()
        .unwrap();
    assert_eq!(err.config_field(), Some("threads"));
}

#[test]
fn sink_failure_stops_the_session_and_aborts_the_sink() {
    let cfg = small_config(1);
    let session = RenderSession::from_sources(&cfg, vec![sine(40.0, 0.5)]).unwrap();
    let mut sink = FailingSink {
        fail_at: 2,
        ..FailingSink::default()
    };

    let err = session
        .render_to_sink(&mut sink, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, WavelockError::Sink(_)));
    assert_eq!(sink.pushed, [0, 1]);
    assert!(sink.aborted);
    assert!(!sink.ended);
}

#[test]
fn cancellation_stops_between_frames() {
    let cfg = small_config(1);
    let session = RenderSession::from_sources(&cfg, vec![sine(40.0, 0.5)]).unwrap();
    let token = CancelToken::new();
    let mut sink = FailingSink {
        fail_at: u64::MAX,
        cancel: Some((1, token.clone())),
        ..FailingSink::default()
    };

    let err = session.render_to_sink(&mut sink, &token).unwrap_err();
    assert!(matches!(err, WavelockError::Cancelled));
    assert_eq!(sink.pushed, [0, 1]);
    assert!(sink.aborted);
    assert!(!sink.ended);
}

#[test]
fn amplification_scales_rendered_windows() {
    let mut cfg = small_config(1);
    cfg.trigger.kind = TriggerKind::Null;
    cfg.amplification = 0.0;
    let mut session = RenderSession::from_sources(&cfg, vec![sine(40.0, 0.5)]).unwrap();
    let frame = session.render_frame(FrameIndex(2)).unwrap();

    // Zero gain flattens the trace onto the center row (y = round(35 / 2) = 18).
    let white = [255, 255, 255, 255];
    for x in 0..64 {
        assert_eq!(frame.pixel(x, 18), white);
    }
    assert!(frame.pixels().filter(|p| *p == white).count() == 64);
}

#[test]
fn channel_windows_follow_nominal_clock_with_null_trigger() {
    let mut cfg = small_config(1);
    cfg.trigger = TriggerConfig {
        kind: TriggerKind::Null,
        ..TriggerConfig::default()
    };
    cfg.render_ms = 1.0;
    let source = SampleSource::from_mono((0..SR).map(|i| i as f32).collect(), SR).unwrap();
    let mut session = RenderSession::from_sources(&cfg, vec![source]).unwrap();

    // Frame 3 at 30 fps is sample 800; an 8-sample centered window starts 4 earlier.
    let t = session.frame_time(FrameIndex(3));
    let window = session.channels[0].window_at(t);
    assert_eq!(window, (796..804).map(|i| i as f32).collect::<Vec<_>>());
}
