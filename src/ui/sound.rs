/// Sound engine: procedural chiptune effects plus optional looping music, via rodio.
///
/// Effects are generated as in-memory WAV buffers at init time and played
/// fire-and-forget. Music is streamed from a file and loops until dropped.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

/// One sound effect per game event worth hearing, least significant first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Sfx {
    Step,
    Slide,
    Switch,
    Unlock,
    Clear,
    Complete,
}

#[cfg(feature = "sound")]
mod inner {
    use std::fs::File;
    use std::io::{BufReader, Cursor};
    use std::path::Path;
    use std::sync::Arc;

    use log::{info, warn};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const MUSIC_VOLUME: f32 = 0.4;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed by `Sfx as usize`.
        buffers: Vec<Arc<Vec<u8>>>,
        _music: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(s) => s,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };

            let buffers = [
                gen_step(),
                gen_slide(),
                gen_switch(),
                gen_unlock(),
                gen_clear(),
                gen_complete(),
            ]
            .iter()
            .map(|s| Arc::new(make_wav(s)))
            .collect();

            Some(SoundEngine { _stream: stream, handle, buffers, _music: None })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx as usize) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Start looping `path` as background music, replacing any current track.
        /// Failures are logged; the game plays on in silence.
        pub fn play_music(&mut self, path: &Path) {
            let file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("music {}: {e}", path.display());
                    return;
                }
            };
            let source = match Decoder::new(BufReader::new(file)) {
                Ok(s) => s,
                Err(e) => {
                    warn!("music {}: {e}", path.display());
                    return;
                }
            };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.set_volume(MUSIC_VOLUME);
                    sink.append(source.repeat_infinite());
                    info!("playing music {}", path.display());
                    self._music = Some(sink);
                }
                Err(e) => warn!("music sink: {e}"),
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    const TAU: f32 = std::f32::consts::TAU;

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// A sequence of (frequency, seconds) notes, each with a decaying envelope.
    /// `harmonic` mixes in the octave for a brighter tone.
    fn notes(seq: &[(f32, f32)], harmonic: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = sample_count(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * (1.0 - harmonic)
                    + (t * freq * 2.0 * TAU).sin() * harmonic;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Footstep: a very short low tick
    fn gen_step() -> Vec<f32> {
        notes(&[(220.0, 0.03)], 0.2, 0.2)
    }

    /// Switch press: two-note click up
    fn gen_switch() -> Vec<f32> {
        notes(&[(660.0, 0.04), (990.0, 0.06)], 0.3, 0.25)
    }

    /// Goal unlocked: rising arpeggio C6→E6→G6
    fn gen_unlock() -> Vec<f32> {
        notes(&[(1047.0, 0.05), (1319.0, 0.05), (1568.0, 0.09)], 0.3, 0.25)
    }

    /// Ice slide: soft noisy swish with falling pitch
    fn gen_slide() -> Vec<f32> {
        let n = sample_count(0.18);
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 900.0 - p * 500.0;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let tone = (t * freq * TAU).sin();
                (tone * 0.3 + noise * 0.7) * (1.0 - p) * 0.15
            })
            .collect()
    }

    /// Room solved: C5→E5→G5→C6 fanfare
    fn gen_clear() -> Vec<f32> {
        notes(&[(523.0, 0.09), (659.0, 0.09), (784.0, 0.09), (1047.0, 0.25)], 0.35, 0.3)
    }

    /// All levels finished: longer fanfare resolving down to C
    fn gen_complete() -> Vec<f32> {
        notes(
            &[(784.0, 0.12), (1047.0, 0.12), (1319.0, 0.12), (1568.0, 0.2), (1047.0, 0.45)],
            0.35,
            0.3,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_sample_count() {
            let wav = make_wav(&[0.0, 0.5, -0.5]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        }

        #[test]
        fn generated_effects_stay_in_range() {
            for samples in [gen_step(), gen_switch(), gen_unlock(), gen_slide(), gen_clear(), gen_complete()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
    pub fn play_music(&mut self, _path: &std::path::Path) {}
}
