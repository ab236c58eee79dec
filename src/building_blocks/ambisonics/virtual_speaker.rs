use crate::building_blocks::convolver::PartitionedConvolver;
use crate::building_blocks::SampleBuffer;
use crate::error::Error;

/**
 * a virtual speaker with ambisonic decoding coefficients and
 * hrtf convolution for first-order b-format streams
 *
 * decodes the b-format block to a mono feed with fixed coefficients,
 * convolves the feed against the speaker position's binaural impulse
 * response (left and right ear independently) and applies a post-gain.
 */
pub struct VirtualSpeaker<const BUFSIZE: usize> {
    coefs: [f32; 4],
    left: PartitionedConvolver<BUFSIZE>,
    right: PartitionedConvolver<BUFSIZE>,
    gain: f32,
}

impl<const BUFSIZE: usize> VirtualSpeaker<BUFSIZE> {
    /// construction fails if the impulse response isn't stereo or its
    /// ears have unequal lengths, nothing is observable of a
    /// half-built speaker. equal lengths keep `ir_frames` honest for
    /// both ears and the tail flush long enough for the later one.
    pub fn from_ir(coefs: [f32; 4], ir: &SampleBuffer, gain: f32) -> Result<Self, Error> {
        let (ir_left, ir_right) = match ir {
            SampleBuffer::Stereo(l, r) => {
                if l.len() != r.len() {
                    return Err(Error::ChannelLengthMismatch);
                }
                (l, r)
            }
            other => return Err(Error::IrChannels(other.channels())),
        };

        Ok(VirtualSpeaker {
            coefs,
            left: PartitionedConvolver::from_ir(ir_left),
            right: PartitionedConvolver::from_ir(ir_right),
            gain,
        })
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn ir_frames(&self) -> usize {
        self.left.ir_frames()
    }

    pub fn process_block(&mut self, input: [[f32; BUFSIZE]; 4]) -> [[f32; BUFSIZE]; 2] {
        let mut feed = [0.0; BUFSIZE];
        for i in 0..BUFSIZE {
            feed[i] = input[0][i] * self.coefs[0]
                + input[1][i] * self.coefs[1]
                + input[2][i] * self.coefs[2]
                + input[3][i] * self.coefs[3];
        }

        let lch = self.left.convolve(feed);
        let rch = self.right.convolve(feed);

        let mut out = [[0.0; BUFSIZE]; 2];
        for i in 0..BUFSIZE {
            out[0][i] = lch[i] * self.gain;
            out[1][i] = rch[i] * self.gain;
        }
        out
    }
}

/**
 * the speaker bank sums all virtual speaker outputs into one
 * stereo bus, this is where the spatial positions are combined
 * into the final render. iteration order is stable.
 */
pub struct SpeakerBank<const BUFSIZE: usize> {
    speakers: Vec<VirtualSpeaker<BUFSIZE>>,
}

impl<const BUFSIZE: usize> Default for SpeakerBank<BUFSIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUFSIZE: usize> SpeakerBank<BUFSIZE> {
    pub fn new() -> Self {
        SpeakerBank {
            speakers: Vec::new(),
        }
    }

    /// construct and register a speaker. a rejected speaker leaves
    /// the bank untouched.
    pub fn add_speaker(
        &mut self,
        coefs: [f32; 4],
        ir: &SampleBuffer,
        gain: f32,
    ) -> Result<(), Error> {
        let speaker = VirtualSpeaker::from_ir(coefs, ir, gain)?;
        self.speakers.push(speaker);
        Ok(())
    }

    pub fn set_speaker_gain(&mut self, idx: usize, gain: f32) {
        if let Some(speaker) = self.speakers.get_mut(idx) {
            speaker.set_gain(gain);
        }
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// longest impulse response in the bank, in frames
    pub fn tail_frames(&self) -> usize {
        self.speakers
            .iter()
            .map(|s| s.ir_frames())
            .max()
            .unwrap_or(0)
    }

    pub fn process_block(&mut self, input: [[f32; BUFSIZE]; 4]) -> [[f32; BUFSIZE]; 2] {
        let mut bus = [[0.0; BUFSIZE]; 2];

        for speaker in self.speakers.iter_mut() {
            let spk_out = speaker.process_block(input);
            for i in 0..BUFSIZE {
                bus[0][i] += spk_out[0][i];
                bus[1][i] += spk_out[1][i];
            }
        }

        bus
    }
}
