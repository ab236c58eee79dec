// crossbeam for the configuration queue
use crossbeam::atomic::AtomicCell;

use std::sync::Arc;

use crate::renderer::ControlMessage;

/// These are the controls, the part which you use in your control
/// thread to steer the renderer (listener orientation, gain trims,
/// etc ...). Updates are handed to the render thread as messages and
/// never touch the dsp state directly, so there's nothing to lock.
pub struct RendererControls {
    control_q_send: crossbeam::channel::Sender<ControlMessage>,
    now: Arc<AtomicCell<f64>>, // shared reference to global time counter
    pub samplerate: f32,
}

impl RendererControls {
    pub(crate) fn new(
        samplerate: f32,
        now: &Arc<AtomicCell<f64>>,
        tx: crossbeam::channel::Sender<ControlMessage>,
    ) -> RendererControls {
        RendererControls {
            control_q_send: tx,
            now: Arc::clone(now),
            samplerate,
        }
    }

    /// replace the 3x3 soundfield rotation matrix (row-major),
    /// typically once per frame to track the listener orientation.
    /// applied by the render thread at the next block boundary.
    pub fn set_rotation_matrix(&self, matrix: [f32; 9]) {
        // if the playhead is gone the pipeline is being torn down,
        // nothing left to steer
        let _ = self
            .control_q_send
            .try_send(ControlMessage::SetRotationMatrix(matrix));
    }

    /// replace the crossover's high-band correction gains
    pub fn set_correction_gains(&self, gains: [f32; 4]) {
        let _ = self
            .control_q_send
            .try_send(ControlMessage::SetCorrectionGains(gains));
    }

    /// replace one virtual speaker's post-gain
    pub fn set_speaker_gain(&self, idx: usize, gain: f32) {
        let _ = self
            .control_q_send
            .try_send(ControlMessage::SetSpeakerGain(idx, gain));
    }

    /// stream time of the render thread, in seconds
    pub fn now(&self) -> f64 {
        self.now.load()
    }
}
