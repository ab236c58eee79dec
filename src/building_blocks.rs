pub mod ambisonics;
pub mod convolver;
pub mod filters;

/// a decoded sample buffer, as delivered by the loader
#[derive(Clone, Debug)]
pub enum SampleBuffer {
    Mono(Vec<f32>),
    Stereo(Vec<f32>, Vec<f32>),
}

impl SampleBuffer {
    pub fn channels(&self) -> usize {
        match self {
            SampleBuffer::Mono(_) => 1,
            SampleBuffer::Stereo(_, _) => 2,
        }
    }

    /// frames per channel (all channels share the same length)
    pub fn frames(&self) -> usize {
        match self {
            SampleBuffer::Mono(s) => s.len(),
            SampleBuffer::Stereo(l, _) => l.len(),
        }
    }
}
