// crossbeam for the configuration queue
use crossbeam::atomic::AtomicCell;

use std::sync::Arc;

use crate::building_blocks::ambisonics::rotator::Rotator;
use crate::building_blocks::ambisonics::virtual_speaker::SpeakerBank;
use crate::building_blocks::filters::phase_matched::PhaseMatchedFilter;
use crate::building_blocks::SampleBuffer;
use crate::error::Error;
use crate::renderer::ControlMessage;

/// This is the "Playhead", that is, the part you use in the output
/// callback of your application (or drive from a plain loop for
/// offline rendering). Pulls b-format blocks through
/// Rotator -> PhaseMatchedFilter -> SpeakerBank in strict sequence.
pub struct RendererPlayhead<const BUFSIZE: usize> {
    rotator: Rotator<BUFSIZE>,
    crossover: PhaseMatchedFilter<BUFSIZE>,
    bank: SpeakerBank<BUFSIZE>,
    control_q_rec: crossbeam::channel::Receiver<ControlMessage>,
    block_duration: f64,
    now: Arc<AtomicCell<f64>>,
}

impl<const BUFSIZE: usize> RendererPlayhead<BUFSIZE> {
    pub(crate) fn new(
        correction_gains: [f32; 4],
        samplerate: f32,
        now: &Arc<AtomicCell<f64>>,
        rx: crossbeam::channel::Receiver<ControlMessage>,
    ) -> RendererPlayhead<BUFSIZE> {
        RendererPlayhead {
            rotator: Rotator::new(),
            crossover: PhaseMatchedFilter::new(correction_gains),
            bank: SpeakerBank::new(),
            control_q_rec: rx,
            block_duration: BUFSIZE as f64 / samplerate as f64,
            now: Arc::clone(now),
        }
    }

    pub(crate) fn add_speaker(
        &mut self,
        coefs: [f32; 4],
        ir: &SampleBuffer,
        gain: f32,
    ) -> Result<(), Error> {
        self.bank.add_speaker(coefs, ir, gain)
    }

    pub fn num_speakers(&self) -> usize {
        self.bank.len()
    }

    /// main processing routine, one b-format block in, one stereo
    /// block out. pending configuration updates are applied here,
    /// at the block boundary, never mid-block.
    pub fn process(&mut self, input: [[f32; BUFSIZE]; 4]) -> [[f32; BUFSIZE]; 2] {
        for msg in self.control_q_rec.try_iter() {
            match msg {
                ControlMessage::SetRotationMatrix(matrix) => {
                    self.rotator.set_rotation_matrix(matrix)
                }
                ControlMessage::SetCorrectionGains(gains) => {
                    self.crossover.set_correction_gains(gains)
                }
                ControlMessage::SetSpeakerGain(idx, gain) => {
                    self.bank.set_speaker_gain(idx, gain)
                }
            }
        }

        let rotated = self.rotator.process_block(input);
        let corrected = self.crossover.process_block(rotated);
        let out = self.bank.process_block(corrected);

        self.now.store(self.now.load() + self.block_duration);

        out
    }

    /// offline batch rendering over arbitrary-length channel buffers.
    /// the final partial block is zero-padded, and enough silent
    /// blocks are appended to flush the convolution tails, so the
    /// output is input length plus the longest impulse response.
    pub fn render(&mut self, input: &[Vec<f32>; 4]) -> Result<(Vec<f32>, Vec<f32>), Error> {
        let frames = input[0].len();
        if input.iter().any(|ch| ch.len() != frames) {
            return Err(Error::ChannelLengthMismatch);
        }

        let total = frames + self.bank.tail_frames();
        let num_blocks = (total + BUFSIZE - 1) / BUFSIZE;

        let mut left = Vec::with_capacity(num_blocks * BUFSIZE);
        let mut right = Vec::with_capacity(num_blocks * BUFSIZE);

        for b in 0..num_blocks {
            let mut block = [[0.0; BUFSIZE]; 4];
            let offset = b * BUFSIZE;
            for ch in 0..4 {
                for i in 0..BUFSIZE {
                    if offset + i < frames {
                        block[ch][i] = input[ch][offset + i];
                    }
                }
            }
            let out = self.process(block);
            left.extend_from_slice(&out[0]);
            right.extend_from_slice(&out[1]);
        }

        left.truncate(total);
        right.truncate(total);

        Ok((left, right))
    }
}
