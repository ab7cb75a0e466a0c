//! Test helpers and fixtures for hum2midi integration tests

#![allow(dead_code)]

use std::path::Path;

/// Sample rate used by the fixtures
pub const TEST_SAMPLE_RATE: f64 = 44100.0;

/// Analysis block size used by the fixtures
pub const TEST_BLOCK_SIZE: usize = 2048;

/// Generate a sine wave at half amplitude.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            ((2.0 * std::f64::consts::PI * frequency * t).sin() * 0.5) as f32
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Concatenate `(frequency, seconds)` segments; a frequency of 0 is silence.
pub fn generate_melody(segments: &[(f64, f64)], sample_rate: f64) -> Vec<f32> {
    let mut out = Vec::new();
    for &(freq, secs) in segments {
        let len = (secs * sample_rate) as usize;
        if freq > 0.0 {
            out.extend(generate_sine(freq, sample_rate, len));
        } else {
            out.extend(generate_silence(len));
        }
    }
    out
}

/// Write mono 16-bit PCM.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create WAV");
    for &s in samples {
        writer
            .write_sample((s * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize WAV");
}

/// (absolute tick, key) of every note-on in a single-track MIDI file.
pub fn note_ons(bytes: &[u8]) -> Vec<(u32, u8)> {
    let smf = midly::Smf::parse(bytes).expect("valid SMF");
    let mut tick = 0u32;
    let mut out = Vec::new();
    for event in &smf.tracks[0] {
        tick += event.delta.as_int();
        if let midly::TrackEventKind::Midi {
            message: midly::MidiMessage::NoteOn { key, vel },
            ..
        } = event.kind
        {
            if vel.as_int() > 0 {
                out.push((tick, key.as_int()));
            }
        }
    }
    out
}

/// MIDI pitches of the notes lasting at least `min_secs`.
pub fn sustained_pitches(notes: &[hum2midi::NoteEvent], min_secs: f64) -> Vec<u8> {
    notes
        .iter()
        .filter(|n| n.duration >= min_secs)
        .map(|n| n.midi)
        .collect()
}
