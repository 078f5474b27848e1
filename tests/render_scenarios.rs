//! Integration: configure a voice → render frames → verify the output.

use sw_render::{Controller, Shaping, VoiceSettings, WaveSelect};

fn controller_with(settings: VoiceSettings) -> Controller {
    let mut ctrl = Controller::new();
    ctrl.set_settings(settings);
    ctrl
}

fn render_seconds(ctrl: &Controller, seconds: f32) -> Vec<sw_render::Frame> {
    ctrl.render_frames(44100, (44100.0 * seconds) as usize)
}

#[test]
fn saw_render_is_nonsilent_and_bounded() {
    let ctrl = controller_with(VoiceSettings::default());
    let frames = render_seconds(&ctrl, 1.0);
    assert!(frames.iter().any(|f| f.left.abs() > 0.1));
    assert!(frames.iter().all(|f| f.left.is_finite() && f.left.abs() < 1.5));
}

#[test]
fn every_waveform_renders_nonsilent() {
    for wave in [
        WaveSelect::Square,
        WaveSelect::Saw,
        WaveSelect::Triangle,
        WaveSelect::Sine,
        WaveSelect::Sub,
    ] {
        let ctrl = controller_with(VoiceSettings {
            wave,
            ..Default::default()
        });
        let frames = render_seconds(&ctrl, 0.25);
        assert!(
            frames.iter().any(|f| f.left.abs() > 0.05),
            "{:?} rendered silence",
            wave
        );
    }
}

#[test]
fn analog_and_digital_renders_differ() {
    let digital = controller_with(VoiceSettings::default());
    let analog = controller_with(VoiceSettings {
        shaping: Shaping::Analog,
        ..Default::default()
    });
    let a = render_seconds(&digital, 0.25);
    let b = render_seconds(&analog, 0.25);
    let diff = a
        .iter()
        .zip(&b)
        .map(|(x, y)| (x.left - y.left).abs())
        .fold(0.0f32, f32::max);
    assert!(diff > 0.05, "max difference {}", diff);
}

#[test]
fn four_lanes_render_bounded() {
    let ctrl = controller_with(VoiceSettings {
        channels: 4,
        pitch: [0.0, 0.25, 0.5, 0.75],
        sub_division: [2, 3, 4, 5],
        ..Default::default()
    });
    let frames = render_seconds(&ctrl, 1.0);
    assert!(frames.iter().any(|f| f.left.abs() > 0.05));
    assert!(frames.iter().all(|f| f.left.is_finite() && f.left.abs() < 2.0));
}

#[test]
fn sub_cycle_rate_follows_division() {
    // The sub saw jumps once per sub cycle; halving the division doubles
    // the jump rate.
    let count_jumps = |division: u32| {
        let ctrl = controller_with(VoiceSettings {
            wave: WaveSelect::Sub,
            sub_division: [division; 4],
            ..Default::default()
        });
        let frames = render_seconds(&ctrl, 1.0);
        frames
            .windows(2)
            .filter(|w| w[1].left - w[0].left < -1.0)
            .count()
    };

    let fast = count_jumps(2);
    let slow = count_jumps(4);
    assert!(fast > 0 && slow > 0);
    let ratio = fast as f32 / slow as f32;
    assert!((ratio - 2.0).abs() < 0.2, "ratio {}", ratio);
}

#[test]
fn rendered_wav_is_well_formed() {
    let ctrl = controller_with(VoiceSettings::default());
    let wav = ctrl.render_to_wav(44100, 1);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(wav.len(), 44 + 44100 * 4);
}
