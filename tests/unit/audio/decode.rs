use super::*;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("wavelock_decode_{}_{name}", std::process::id()))
}

#[test]
fn decodes_16_bit_stereo_wav() {
    let path = temp_path("stereo16.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(&path, spec).unwrap();
    for (l, r) in [(16384i16, 0i16), (-32768, -32768), (0, 16384)] {
        w.write_sample(l).unwrap();
        w.write_sample(r).unwrap();
    }
    w.finalize().unwrap();

    let src = open_audio(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(src.sample_rate(), 8000);
    assert_eq!(src.channel_count(), 2);
    assert_eq!(src.total_length(), 3);
    assert_eq!(src.downmix_to_mono(), &[0.25, -1.0, 0.25]);
}

#[test]
fn decodes_float_mono_wav() {
    let path = temp_path("mono32f.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut w = hound::WavWriter::create(&path, spec).unwrap();
    for s in [0.5f32, -0.125, 1.0] {
        w.write_sample(s).unwrap();
    }
    w.finalize().unwrap();

    let src = decode_wav(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(src.read_window(-1, 5), vec![0.0, 0.5, -0.125, 1.0, 0.0]);
}

#[test]
fn corrupt_wav_is_a_decode_error() {
    let path = temp_path("corrupt.wav");
    std::fs::write(&path, b"RIFF\x00\x00\x00\x00not a wave file").unwrap();
    let err = open_audio(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, WavelockError::Decode(_)), "{err}");
}

#[test]
fn missing_file_is_a_decode_error() {
    let err = open_audio(&temp_path("does_not_exist.wav")).unwrap_err();
    assert!(matches!(err, WavelockError::Decode(_)));
}
