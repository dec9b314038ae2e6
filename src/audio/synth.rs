use std::sync::Arc;

pub const SAMPLE_RATE: u32 = 44_100;

/// Fraction of the signed 16-bit range used by generated tones.
pub const AMPLITUDE: f64 = 0.5;

/// Mono, 16-bit PCM at [`SAMPLE_RATE`]. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    samples: Arc<[i16]>,
}

impl ToneBuffer {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Number of samples covering `duration_ms`, rounded to the nearest sample.
pub fn sample_count(duration_ms: u32) -> usize {
    ((u64::from(SAMPLE_RATE) * u64::from(duration_ms) + 500) / 1000) as usize
}

/// Renders a sine tone at `frequency_hz` lasting `duration_ms`.
///
/// Returns `None` for silence: a zero frequency (the rest), any frequency that
/// cannot be represented at [`SAMPLE_RATE`], or a duration too short to hold a
/// single sample.
pub fn synth(frequency_hz: f64, duration_ms: u32) -> Option<ToneBuffer> {
    let nyquist = f64::from(SAMPLE_RATE) / 2.0;
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 || frequency_hz >= nyquist {
        return None;
    }

    let len = sample_count(duration_ms);
    if len == 0 {
        return None;
    }

    let rate = f64::from(SAMPLE_RATE);
    let scale = AMPLITUDE * f64::from(i16::MAX);
    let samples: Arc<[i16]> = (0..len)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * frequency_hz * i as f64 / rate;
            (scale * phase.sin()).round() as i16
        })
        .collect();

    Some(ToneBuffer { samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_is_one_sample_rate() {
        let tone = synth(440.0, 1000).unwrap();
        assert_eq!(tone.len(), 44_100);
    }

    #[test]
    fn rest_is_silence() {
        for duration in [1, 200, 1000, u32::MAX] {
            assert!(synth(0.0, duration).is_none());
        }
    }

    #[test]
    fn out_of_range_frequency_is_silence() {
        assert!(synth(-110.0, 100).is_none());
        assert!(synth(f64::NAN, 100).is_none());
        assert!(synth(f64::INFINITY, 100).is_none());
        assert!(synth(22_050.0, 100).is_none());
    }

    #[test]
    fn sample_count_rounds() {
        assert_eq!(sample_count(1), 44);
        assert_eq!(sample_count(300), 13_230);
        assert_eq!(sample_count(500), 22_050);
        // 44.1 * 10 = 441 exactly, 44.1 * 3 = 132.3 -> 132
        assert_eq!(sample_count(10), 441);
        assert_eq!(sample_count(3), 132);
        assert_eq!(sample_count(0), 0);
        assert!(synth(440.0, 0).is_none());
    }

    #[test]
    fn samples_follow_the_formula() {
        let tone = synth(110.0, 50).unwrap();
        for (i, &sample) in tone.samples().iter().enumerate() {
            let phase = 2.0 * std::f64::consts::PI * 110.0 * i as f64 / 44_100.0;
            let expected = (0.5 * 32767.0 * phase.sin()).round() as i16;
            assert_eq!(sample, expected, "sample {i}");
        }
        assert_eq!(tone.samples()[0], 0);
    }

    #[test]
    fn amplitude_is_half_scale() {
        let tone = synth(441.0, 100).unwrap();
        let peak = tone.samples().iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= 16_384);
        // 441 Hz puts a sample exactly on every quarter period.
        assert_eq!(peak, 16_384);
    }

    #[test]
    fn deterministic() {
        assert_eq!(synth(138.6, 300), synth(138.6, 300));
    }
}
