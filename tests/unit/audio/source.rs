use super::*;

fn ramp(n: usize) -> SampleSource {
    SampleSource::from_mono((1..=n).map(|i| i as f32).collect(), 100).unwrap()
}

#[test]
fn read_window_always_returns_requested_length() {
    let src = ramp(10);
    for start in [-25i64, -10, -3, 0, 4, 9, 10, 40] {
        for length in [0usize, 1, 5, 10, 31] {
            let w = src.read_window(start, length);
            assert_eq!(w.len(), length, "start={start} length={length}");
            for (i, &v) in w.iter().enumerate() {
                let pos = start + i as i64;
                if (0..10).contains(&pos) {
                    assert_eq!(v, (pos + 1) as f32);
                } else {
                    assert_eq!(v, 0.0, "pos={pos} must be silence");
                }
            }
        }
    }
}

#[test]
fn strided_reads_skip_samples_and_pad() {
    let src = ramp(10);
    assert_eq!(
        src.read_window_strided(-2, 5, 3),
        vec![0.0, 2.0, 5.0, 8.0, 0.0]
    );
    // A zero stride is treated as contiguous.
    assert_eq!(src.read_window_strided(0, 3, 0), vec![1.0, 2.0, 3.0]);
}

#[test]
fn downmix_is_mean_and_order_independent() {
    let a = vec![1.0, 0.5, -1.0];
    let b = vec![0.0, 0.25, 1.0];
    let c = vec![0.2, -0.75, 0.1];

    let abc = SampleSource::from_channels(vec![a.clone(), b.clone(), c.clone()], 8000).unwrap();
    let cab = SampleSource::from_channels(vec![c, a, b], 8000).unwrap();

    assert_eq!(abc.downmix_to_mono(), cab.downmix_to_mono());
    let m = abc.downmix_to_mono();
    assert!((m[0] - 0.4).abs() < 1e-6);
    assert!((m[1] - 0.0).abs() < 1e-6);
    assert!((m[2] - 0.033_333).abs() < 1e-5);
}

#[test]
fn interleaved_input_is_split_per_channel() {
    let src = SampleSource::from_interleaved(&[1.0, -1.0, 0.5, 0.5], 2, 44_100).unwrap();
    assert_eq!(src.channel_count(), 2);
    assert_eq!(src.total_length(), 2);
    assert_eq!(src.read_channel_window(1, 0, 3).unwrap(), vec![-1.0, 0.5, 0.0]);
    assert_eq!(src.downmix_to_mono(), &[0.0, 0.5]);
    assert!(src.read_channel_window(2, 0, 1).is_err());
}

#[test]
fn construction_rejects_inconsistent_audio() {
    assert!(SampleSource::from_channels(vec![], 100).is_err());
    assert!(SampleSource::from_channels(vec![vec![0.0; 3], vec![0.0; 2]], 100).is_err());
    assert!(SampleSource::from_mono(vec![0.0], 0).is_err());
    assert!(SampleSource::from_interleaved(&[0.0; 3], 2, 100).is_err());
}

#[test]
fn metadata_is_reported() {
    let src = ramp(250);
    assert_eq!(src.sample_rate(), 100);
    assert_eq!(src.total_length(), 250);
    assert_eq!(src.duration_secs(), 2.5);
}

#[test]
fn reads_near_index_limits_are_silence() {
    let src = ramp(10);
    assert_eq!(src.read_window(i64::MAX - 2, 8), vec![0.0; 8]);
    assert_eq!(src.read_window(i64::MIN, 8), vec![0.0; 8]);
    assert_eq!(src.read_window_strided(i64::MAX - 2, 4, 3), vec![0.0; 4]);
    assert_eq!(src.read_window_strided(i64::MIN, 4, 3), vec![0.0; 4]);
}
