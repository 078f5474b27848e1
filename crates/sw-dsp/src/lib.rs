//! Band-limited subharmonic oscillator core for subwave.
//!
//! A polyphonic (up to four lane) VCO voice: square, saw, triangle and
//! sine outputs with minBLEP alias suppression, hard/soft sync, and a
//! sub-oscillator phase-locked to an integer division of the primary
//! cycle. The per-sample path is allocation-free; impulse table
//! construction is std-only and never runs on the audio path.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod diag;
pub mod edge;
mod filter;
mod frame;
mod kernel;
mod minblep;
mod phase;
mod pitch;
mod subharmonic;
mod voice;
pub mod waveform;

pub use diag::{Diag, NullDiag};
pub use edge::CrossingSet;
pub use filter::RcFilter;
pub use frame::Frame;
pub use kernel::MinBlepTable;
pub use minblep::MinBlepBuffer;
pub use phase::{delta_phase, wrap, DELTA_PHASE_MAX, DELTA_PHASE_MIN};
pub use pitch::{volt_to_hz, FREQ_C4};
pub use subharmonic::{SubDivider, DIVISION_MAX, DIVISION_MIN};
pub use voice::{SubVoice, SUB_PHASE_LIMIT};
pub use waveform::Shaping;

/// Number of polyphonic lanes a voice carries.
pub const MAX_LANES: usize = 4;
