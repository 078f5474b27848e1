//! subwave CLI — renders the band-limited voice to WAV or plays it live.
//!
//! Usage:
//!   subwave --wave saw --pitch 0 --sub 4 --seconds 5 --wav out.wav
//!   subwave --wave square --analog --sub-mix 0.5

use std::{env, fs, process};

use sw_dsp::MAX_LANES;
use sw_render::{Controller, Shaping, VoiceSettings, WaveSelect};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return;
    }

    let (settings, wav_path, seconds) = parse_args(&args);

    let mut ctrl = Controller::new();
    ctrl.set_settings(settings);

    let s = ctrl.settings();
    println!("Wave:      {:?}", s.wave);
    println!("Shaping:   {:?}", s.shaping);
    println!("Channels:  {}", s.channels);
    println!("Pitch:     {:?} V", &s.pitch[..s.channels.max(1)]);
    println!("Sub div:   {:?}", &s.sub_division[..s.channels.max(1)]);
    println!("Pulse:     {}", s.pulse_width);
    println!("Sub mix:   {}", s.sub_mix);
    println!();

    match wav_path {
        Some(path) => render_to_wav(&ctrl, &path, seconds),
        None => play_audio(&mut ctrl, seconds),
    }
}

fn usage() {
    println!("Usage: subwave [options]");
    println!("  --wave <square|saw|triangle|sine|sub>   output waveform (default saw)");
    println!("  --pitch <volts>                         volt/octave pitch, 0 = C4");
    println!("  --channels <0-4>                        active lanes (default 1)");
    println!("  --sub <1-32>                            sub division (default 2)");
    println!("  --pw <0-1>                              square pulse width");
    println!("  --sub-mix <0-1>                         sub level under the main wave");
    println!("  --analog                                analog waveshaping");
    println!("  --seconds <n>                           duration (default 5)");
    println!("  --wav <path>                            render to WAV instead of playing");
}

fn parse_args(args: &[String]) -> (VoiceSettings, Option<String>, u32) {
    let mut settings = VoiceSettings::default();
    let mut wav_path = None;
    let mut seconds = 5u32;

    let value_of = |flag: &str| -> Option<&String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
    };

    if let Some(v) = value_of("--wave") {
        settings.wave = match v.as_str() {
            "square" => WaveSelect::Square,
            "saw" => WaveSelect::Saw,
            "triangle" => WaveSelect::Triangle,
            "sine" => WaveSelect::Sine,
            "sub" => WaveSelect::Sub,
            other => {
                eprintln!("Unknown wave: {}", other);
                process::exit(1);
            }
        };
    }
    if let Some(v) = value_of("--pitch") {
        let pitch = parse_or_die(v, "--pitch");
        settings.pitch = [pitch; MAX_LANES];
    }
    if let Some(v) = value_of("--channels") {
        settings.channels = parse_or_die(v, "--channels");
        if settings.channels > MAX_LANES {
            eprintln!("--channels must be 0-4");
            process::exit(1);
        }
    }
    if let Some(v) = value_of("--sub") {
        let div: u32 = parse_or_die(v, "--sub");
        if !(1..=32).contains(&div) {
            eprintln!("--sub must be 1-32");
            process::exit(1);
        }
        settings.sub_division = [div; MAX_LANES];
    }
    if let Some(v) = value_of("--pw") {
        settings.pulse_width = parse_or_die(v, "--pw");
    }
    if let Some(v) = value_of("--sub-mix") {
        settings.sub_mix = parse_or_die(v, "--sub-mix");
    }
    if args.iter().any(|a| a == "--analog") {
        settings.shaping = Shaping::Analog;
    }
    if let Some(v) = value_of("--seconds") {
        seconds = parse_or_die(v, "--seconds");
    }
    if let Some(v) = value_of("--wav") {
        wav_path = Some(v.clone());
    }

    (settings, wav_path, seconds)
}

fn parse_or_die<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {}: {}", flag, value);
        process::exit(1);
    })
}

fn play_audio(ctrl: &mut Controller, seconds: u32) {
    ctrl.play();
    println!("Playing for {} s...", seconds);

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(seconds as u64);
    while ctrl.is_playing() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    ctrl.stop();

    println!("Done.");
}

fn render_to_wav(ctrl: &Controller, path: &str, seconds: u32) {
    let sample_rate: u32 = 44100;
    println!("Rendering {} s to {} at {} Hz...", seconds, path, sample_rate);

    let wav = ctrl.render_to_wav(sample_rate, seconds);
    println!("Rendered {} bytes", wav.len());

    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        process::exit(1);
    });

    println!("Done.");
}
