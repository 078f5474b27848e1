//! The oscillator voice: band-limited square, saw, triangle and sine
//! plus a phase-locked sub-harmonic, over up to four independent lanes.
//!
//! One `process` call advances every lane by one sample: phases move,
//! threshold crossings are back-solved to sub-sample accuracy, the
//! matching step corrections land in the per-lane-per-waveform ring
//! buffers, sync is resolved, and the naive evaluators plus consumed
//! corrections produce the outputs. Configuration happens at control
//! rate through `configure`/`set_*` and is validated there, never on
//! the sample path.

use alloc::sync::Arc;
use core::array;

use libm::sinf;

use crate::diag::Diag;
use crate::edge;
use crate::filter::RcFilter;
use crate::kernel::MinBlepTable;
use crate::minblep::MinBlepBuffer;
use crate::phase::{self, delta_phase};
use crate::pitch::volt_to_hz;
use crate::subharmonic::SubDivider;
use crate::waveform::{self, Shaping};
use crate::MAX_LANES;

/// Safety bound on the unwrapped sub phase. Exceeding it means the
/// divider and the sub frequency disagree; the phase is saturated and
/// the diagnostic hook notified.
pub const SUB_PHASE_LIMIT: f32 = 2.0;

const PULSE_WIDTH_MIN: f32 = 0.01;

/// A polyphonic band-limited oscillator voice.
pub struct SubVoice {
    shaping: Shaping,
    soft_sync: bool,
    sync_enabled: bool,
    channels: usize,

    phase: [f32; MAX_LANES],
    sub_phase: [f32; MAX_LANES],
    freq: [f32; MAX_LANES],
    sub_freq: [f32; MAX_LANES],
    pulse_width: [f32; MAX_LANES],
    sync_direction: [f32; MAX_LANES],
    last_sync: [f32; MAX_LANES],

    divider: SubDivider,
    sqr_filter: [RcFilter; MAX_LANES],

    sqr_blep: [MinBlepBuffer; MAX_LANES],
    saw_blep: [MinBlepBuffer; MAX_LANES],
    tri_blep: [MinBlepBuffer; MAX_LANES],
    sin_blep: [MinBlepBuffer; MAX_LANES],

    sqr_value: [f32; MAX_LANES],
    saw_value: [f32; MAX_LANES],
    tri_value: [f32; MAX_LANES],
    sin_value: [f32; MAX_LANES],
    sub_value: [f32; MAX_LANES],

    diag: Arc<dyn Diag>,
}

impl SubVoice {
    /// Build a voice over `table`, reporting diagnostics to `diag`.
    pub fn new(table: Arc<MinBlepTable>, diag: Arc<dyn Diag>) -> Self {
        Self {
            shaping: Shaping::Digital,
            soft_sync: false,
            sync_enabled: false,
            channels: 0,
            phase: [0.0; MAX_LANES],
            sub_phase: [0.0; MAX_LANES],
            freq: [0.0; MAX_LANES],
            sub_freq: [0.0; MAX_LANES],
            pulse_width: [0.5; MAX_LANES],
            sync_direction: [1.0; MAX_LANES],
            last_sync: [0.0; MAX_LANES],
            divider: SubDivider::new(),
            sqr_filter: [RcFilter::new(); MAX_LANES],
            sqr_blep: array::from_fn(|_| MinBlepBuffer::new(table.clone())),
            saw_blep: array::from_fn(|_| MinBlepBuffer::new(table.clone())),
            tri_blep: array::from_fn(|_| MinBlepBuffer::new(table.clone())),
            sin_blep: array::from_fn(|_| MinBlepBuffer::new(table.clone())),
            sqr_value: [0.0; MAX_LANES],
            saw_value: [0.0; MAX_LANES],
            tri_value: [0.0; MAX_LANES],
            sin_value: [0.0; MAX_LANES],
            sub_value: [0.0; MAX_LANES],
            diag,
        }
    }

    /// Voice over the shared default table with diagnostics discarded.
    #[cfg(feature = "std")]
    pub fn with_default_table() -> Self {
        Self::new(MinBlepTable::shared(), Arc::new(crate::diag::NullDiag))
    }

    /// Control-rate reconfiguration: active lane count, per-lane pitch
    /// (volt/octave, 0 V = C4), per-lane sub division in [1, 32].
    ///
    /// Frequencies and sub phases of lanes at `channels` and above are
    /// forced to zero so an idle lane cannot drift toward the sub-phase
    /// bound between control updates.
    pub fn configure(
        &mut self,
        channels: usize,
        pitch: [f32; MAX_LANES],
        sub_division: [u32; MAX_LANES],
    ) {
        assert!(channels <= MAX_LANES, "channel count out of range: {channels}");
        self.channels = channels;
        self.divider.configure(sub_division);
        for lane in 0..MAX_LANES {
            self.freq[lane] = volt_to_hz(pitch[lane]);
            self.sub_freq[lane] = self.freq[lane] / self.divider.division(lane) as f32;
        }
        for lane in channels..MAX_LANES {
            self.freq[lane] = 0.0;
            self.sub_freq[lane] = 0.0;
            self.sub_phase[lane] = 0.0;
        }
    }

    /// Set the square duty threshold per lane, clamped to [0.01, 0.99].
    pub fn set_pulse_width(&mut self, pulse_width: [f32; MAX_LANES]) {
        for lane in 0..MAX_LANES {
            self.pulse_width[lane] =
                pulse_width[lane].clamp(PULSE_WIDTH_MIN, 1.0 - PULSE_WIDTH_MIN);
        }
    }

    /// Select digital or analog waveshaping.
    pub fn set_shaping(&mut self, shaping: Shaping) {
        self.shaping = shaping;
    }

    /// Enable sync. With `soft`, a trigger reverses the phase direction
    /// instead of resetting the phase.
    pub fn set_sync(&mut self, enabled: bool, soft: bool) {
        self.sync_enabled = enabled;
        self.soft_sync = soft;
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shaping(&self) -> Shaping {
        self.shaping
    }

    /// Band-limited square output, one value per lane.
    pub fn square(&self) -> [f32; MAX_LANES] {
        self.sqr_value
    }

    /// Band-limited saw output.
    pub fn saw(&self) -> [f32; MAX_LANES] {
        self.saw_value
    }

    /// Triangle output.
    pub fn triangle(&self) -> [f32; MAX_LANES] {
        self.tri_value
    }

    /// Sine output.
    pub fn sine(&self) -> [f32; MAX_LANES] {
        self.sin_value
    }

    /// Sub-harmonic output (naive saw on the divided phase).
    pub fn sub(&self) -> [f32; MAX_LANES] {
        self.sub_value
    }

    /// Raw-phase sine for panel feedback; not band-limited.
    pub fn light(&self) -> [f32; MAX_LANES] {
        array::from_fn(|lane| sinf(core::f32::consts::TAU * self.phase[lane]))
    }

    /// Advance the voice by one sample.
    ///
    /// `delta_time` is the sample period in seconds; `sync` is the
    /// external sync signal per lane. Any float is accepted; NaN and
    /// non-crossing values are treated as "no sync event".
    pub fn process(&mut self, delta_time: f32, sync: [f32; MAX_LANES]) {
        let mut dp = [0.0f32; MAX_LANES];
        let mut dsp = [0.0f32; MAX_LANES];
        for lane in 0..MAX_LANES {
            dp[lane] = delta_phase(self.freq[lane], delta_time);
            dsp[lane] = delta_phase(self.sub_freq[lane], delta_time);
        }

        if self.soft_sync {
            // Reversed lanes travel backwards.
            for lane in 0..MAX_LANES {
                dp[lane] *= self.sync_direction[lane];
            }
        } else {
            self.sync_direction = [1.0; MAX_LANES];
        }

        for lane in 0..MAX_LANES {
            self.phase[lane] = phase::advance_wrapped(self.phase[lane], dp[lane]);
            // The sub phase is only ever wrapped by the divider reset.
            self.sub_phase[lane] = phase::advance_free(self.sub_phase[lane], dsp[lane]);
            if self.sub_phase[lane] > SUB_PHASE_LIMIT {
                self.diag.sub_phase_overflow(lane, self.sub_phase[lane]);
                self.sub_phase[lane] = SUB_PHASE_LIMIT;
            }
        }

        // Square jumps at the wrap point: 0 going forward, 1 for a lane
        // running backwards under soft sync.
        let wrap_threshold: [f32; MAX_LANES] =
            array::from_fn(|lane| if self.sync_direction[lane] == -1.0 { 1.0 } else { 0.0 });
        let wrap = edge::scan(&wrap_threshold, &self.phase, &dp, self.channels);
        for lane in 0..self.channels {
            if wrap.fired(lane) {
                let jump = 2.0 * self.sync_direction[lane];
                self.sqr_blep[lane].insert_discontinuity(wrap.offset(lane), jump);
            }
        }

        // Square jumps again at the pulse-width threshold.
        let pulse = edge::scan(&self.pulse_width, &self.phase, &dp, self.channels);
        for lane in 0..self.channels {
            if pulse.fired(lane) {
                let jump = -2.0 * self.sync_direction[lane];
                self.sqr_blep[lane].insert_discontinuity(pulse.offset(lane), jump);
            }
        }

        // Saw wraps at 0.5; the same event clocks the sub divider.
        let half = edge::scan(&[0.5; MAX_LANES], &self.phase, &dp, self.channels);
        for lane in 0..self.channels {
            if half.fired(lane) {
                let jump = -2.0 * self.sync_direction[lane];
                self.saw_blep[lane].insert_discontinuity(half.offset(lane), jump);
                if self.divider.on_cycle(lane) {
                    self.sub_phase[lane] = 0.0;
                }
            }
        }

        if self.sync_enabled {
            self.detect_sync(&dp, sync);
        }

        // Naive evaluation plus pending corrections.
        for lane in 0..MAX_LANES {
            let mut sqr = waveform::square(self.phase[lane], self.pulse_width[lane]);
            sqr += self.sqr_blep[lane].process();
            if self.shaping == Shaping::Analog {
                // Strip the DC offset the shaped edges introduce.
                self.sqr_filter[lane].set_cutoff(20.0 * delta_time);
                self.sqr_filter[lane].process(sqr);
                sqr = self.sqr_filter[lane].highpass() * 0.95;
            }
            self.sqr_value[lane] = sqr;

            self.saw_value[lane] =
                waveform::saw(self.phase[lane], self.shaping) + self.saw_blep[lane].process();
            self.tri_value[lane] =
                waveform::triangle(self.phase[lane], self.shaping) + self.tri_blep[lane].process();
            self.sin_value[lane] =
                waveform::sine(self.phase[lane], self.shaping) + self.sin_blep[lane].process();
            self.sub_value[lane] = waveform::saw(self.sub_phase[lane], self.shaping);
        }
    }

    /// Detect a rising zero crossing of the sync input and either reverse
    /// (soft) or reset (hard) each fired lane. A hard reset inserts every
    /// waveform's value jump into its correction buffer so the output
    /// stays continuous apart from the intended sync edge.
    fn detect_sync(&mut self, dp: &[f32; MAX_LANES], sync: [f32; MAX_LANES]) {
        let mut fired = [false; MAX_LANES];
        let mut crossing = [0.0f32; MAX_LANES];
        for lane in 0..MAX_LANES {
            let delta_sync = sync[lane] - self.last_sync[lane];
            let c = -self.last_sync[lane] / delta_sync;
            // NaN and out-of-interval values fail these comparisons.
            if c > 0.0 && c <= 1.0 && sync[lane] >= 0.0 {
                fired[lane] = true;
                crossing[lane] = c;
            }
            self.last_sync[lane] = sync[lane];
        }

        if self.soft_sync {
            for lane in 0..MAX_LANES {
                if fired[lane] {
                    self.sync_direction[lane] = -self.sync_direction[lane];
                }
            }
            return;
        }

        for lane in 0..MAX_LANES {
            if !fired[lane] {
                continue;
            }
            let new_phase = (1.0 - crossing[lane]) * dp[lane];
            if lane < self.channels {
                let offset = crossing[lane] - 1.0;
                let old = self.phase[lane];
                let pw = self.pulse_width[lane];
                let shaping = self.shaping;

                let jump = waveform::square(new_phase, pw) - waveform::square(old, pw);
                self.sqr_blep[lane].insert_discontinuity(offset, jump);
                let jump = waveform::saw(new_phase, shaping) - waveform::saw(old, shaping);
                self.saw_blep[lane].insert_discontinuity(offset, jump);
                let jump = waveform::triangle(new_phase, shaping) - waveform::triangle(old, shaping);
                self.tri_blep[lane].insert_discontinuity(offset, jump);
                let jump = waveform::sine(new_phase, shaping) - waveform::sine(old, shaping);
                self.sin_blep[lane].insert_discontinuity(offset, jump);
            }
            self.phase[lane] = new_phase;
        }
    }
}
