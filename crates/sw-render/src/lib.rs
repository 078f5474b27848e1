//! Headless controller for subwave.
//!
//! Owns a voice configuration and drives offline rendering or live
//! playback, so the CLI (or any other frontend) never touches the
//! engine crates directly.

mod wav;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use sw_audio::{AudioOutput, CpalOutput};
use sw_dsp::{MinBlepTable, NullDiag, SubVoice, MAX_LANES};

// Re-export common types so callers don't need sw-dsp/sw-audio directly.
pub use sw_dsp::{Frame, Shaping};
pub use wav::{frames_to_wav, write_wav};

/// Which voice output the controller renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaveSelect {
    Square,
    #[default]
    Saw,
    Triangle,
    Sine,
    Sub,
}

/// Control-rate settings for the rendered voice.
#[derive(Clone, Copy, Debug)]
pub struct VoiceSettings {
    /// Active lanes, 0 to 4.
    pub channels: usize,
    /// Volt-per-octave pitch per lane (0 V = C4).
    pub pitch: [f32; MAX_LANES],
    /// Sub division per lane, 1 to 32.
    pub sub_division: [u32; MAX_LANES],
    /// Square duty threshold (clamped by the voice).
    pub pulse_width: f32,
    pub shaping: Shaping,
    pub wave: WaveSelect,
    /// Level of the sub oscillator mixed under the selected wave, 0 to 1.
    pub sub_mix: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            channels: 1,
            pitch: [0.0; MAX_LANES],
            sub_division: [2; MAX_LANES],
            pulse_width: 0.5,
            shaping: Shaping::Digital,
            wave: WaveSelect::Saw,
            sub_mix: 0.0,
        }
    }
}

/// Headroom applied to the summed lane mix.
const MIX_GAIN: f32 = 0.8;

/// Headless voice controller — owns the settings and manages playback.
pub struct Controller {
    settings: VoiceSettings,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            settings: VoiceSettings::default(),
            playback: None,
        }
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Replace the voice settings. Stops any running playback first.
    pub fn set_settings(&mut self, settings: VoiceSettings) {
        self.stop();
        self.settings = settings;
    }

    // --- Real-time playback ---

    /// Start live playback on a spawned audio thread.
    pub fn play(&mut self) {
        self.stop();

        let settings = self.settings;
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || {
            audio_thread(settings, stop, done);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            finished,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    // --- Offline rendering ---

    /// Render `max_frames` frames of the configured voice.
    pub fn render_frames(&self, sample_rate: u32, max_frames: usize) -> Vec<Frame> {
        let mut voice = build_voice(&self.settings);
        let delta_time = 1.0 / sample_rate as f32;

        let mut frames = Vec::with_capacity(max_frames);
        for _ in 0..max_frames {
            voice.process(delta_time, [0.0; MAX_LANES]);
            frames.push(mix_frame(&voice, &self.settings));
        }
        frames
    }

    /// Render to a complete WAV file image (16-bit stereo PCM).
    pub fn render_to_wav(&self, sample_rate: u32, seconds: u32) -> Vec<u8> {
        let frames = self.render_frames(sample_rate, (sample_rate * seconds) as usize);
        wav::frames_to_wav(&frames, sample_rate)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

fn build_voice(settings: &VoiceSettings) -> SubVoice {
    let mut voice = SubVoice::new(MinBlepTable::shared(), Arc::new(NullDiag));
    voice.configure(settings.channels, settings.pitch, settings.sub_division);
    voice.set_pulse_width([settings.pulse_width; MAX_LANES]);
    voice.set_shaping(settings.shaping);
    voice
}

/// Sum the active lanes of the selected output, blend the sub under it,
/// and fold down to a stereo frame.
fn mix_frame(voice: &SubVoice, settings: &VoiceSettings) -> Frame {
    let values = match settings.wave {
        WaveSelect::Square => voice.square(),
        WaveSelect::Saw => voice.saw(),
        WaveSelect::Triangle => voice.triangle(),
        WaveSelect::Sine => voice.sine(),
        WaveSelect::Sub => voice.sub(),
    };
    let subs = voice.sub();

    let lanes = settings.channels.max(1);
    let mut sum = 0.0;
    for lane in 0..settings.channels {
        sum += values[lane] + settings.sub_mix * subs[lane];
    }
    Frame::mono(sum / lanes as f32 * MIX_GAIN)
}

fn audio_thread(settings: VoiceSettings, stop_signal: Arc<AtomicBool>, finished: Arc<AtomicBool>) {
    let Ok((mut output, consumer)) = CpalOutput::new() else {
        finished.store(true, Ordering::Relaxed);
        return;
    };
    if output.build_stream(consumer).is_err() {
        finished.store(true, Ordering::Relaxed);
        return;
    }
    let _ = output.start();

    let sample_rate = output.sample_rate();
    let delta_time = 1.0 / sample_rate as f32;
    let mut voice = build_voice(&settings);

    while !stop_signal.load(Ordering::Relaxed) {
        voice.process(delta_time, [0.0; MAX_LANES]);
        output.write_spin(mix_frame(&voice, &settings));
    }

    let _ = output.stop();
    finished.store(true, Ordering::Relaxed);
}
