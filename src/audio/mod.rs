mod frequency;
mod output;
mod synth;

pub use frequency::FrequencyTable;
pub use output::{AudioError, CpalTonePlayer};
pub use synth::{AMPLITUDE, SAMPLE_RATE, ToneBuffer, sample_count, synth};
