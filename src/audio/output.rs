use super::synth::{SAMPLE_RATE, ToneBuffer};
use crate::presentation::TonePlayer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Producer, Split},
};
use tracing::{info, warn};

const TONE_QUEUE: usize = 64;
const MAX_VOICES: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device")]
    NoDevice,
    #[error("default output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("starting output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Plays tone buffers on the default output device. Overlapping tones are
/// mixed, so a second source never waits for the first one's note to end.
pub struct CpalTonePlayer {
    producer: HeapProd<ToneBuffer>,
    _stream: cpal::Stream,
}

impl CpalTonePlayer {
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let config = device.default_output_config()?;
        let stream_config: cpal::StreamConfig = config.into();

        let channels = stream_config.channels as usize;
        let device_rate = stream_config.sample_rate as f64;
        info!("Audio output: {} channels, {} Hz", channels, device_rate);

        let (producer, consumer) = HeapRb::<ToneBuffer>::new(TONE_QUEUE).split();
        let mut mixer = Mixer::new(consumer, channels, f64::from(SAMPLE_RATE) / device_rate);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| mixer.render(data),
            |err| warn!("Audio error: {}", err),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            producer,
            _stream: stream,
        })
    }
}

impl TonePlayer for CpalTonePlayer {
    fn play(&mut self, tone: ToneBuffer) {
        if self.producer.try_push(tone).is_err() {
            warn!("tone queue full, dropping tone");
        }
    }
}

struct Voice {
    tone: ToneBuffer,
    position: f64,
}

/// Runs on the audio callback: pulls new tones off the ring and sums every
/// active one into the device buffer.
struct Mixer {
    consumer: HeapCons<ToneBuffer>,
    voices: Vec<Voice>,
    channels: usize,
    /// Source samples advanced per device frame.
    step: f64,
}

impl Mixer {
    fn new(consumer: HeapCons<ToneBuffer>, channels: usize, step: f64) -> Self {
        Self {
            consumer,
            voices: Vec::with_capacity(MAX_VOICES),
            channels: channels.max(1),
            step,
        }
    }

    fn render(&mut self, data: &mut [f32]) {
        while self.voices.len() < MAX_VOICES {
            match self.consumer.try_pop() {
                Some(tone) => self.voices.push(Voice {
                    tone,
                    position: 0.0,
                }),
                None => break,
            }
        }

        for frame in data.chunks_mut(self.channels) {
            let mut sample = 0.0;
            for voice in &mut self.voices {
                if let Some(&s) = voice.tone.samples().get(voice.position as usize) {
                    sample += f32::from(s) / f32::from(i16::MAX);
                }
                voice.position += self.step;
            }
            frame.fill(sample.clamp(-1.0, 1.0));
        }

        self.voices
            .retain(|voice| (voice.position as usize) < voice.tone.len());
    }
}
