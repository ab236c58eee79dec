pub mod renderer_controls;
pub mod renderer_playhead;

// crossbeam for the configuration queue
use crossbeam::atomic::AtomicCell;
use crossbeam::channel::Receiver;
use crossbeam::channel::Sender;

use std::sync::Arc;

use log::debug;
use rubato::{FftFixedIn, Resampler};

use crate::building_blocks::SampleBuffer;
use crate::error::Error;

pub use crate::renderer::{renderer_controls::*, renderer_playhead::*};

/// configuration updates travel from the control thread to the
/// render thread as immutable payloads, applied at block boundaries
pub(crate) enum ControlMessage {
    SetRotationMatrix([f32; 9]),
    SetCorrectionGains([f32; 4]),
    SetSpeakerGain(usize, f32),
}

/// everything needed to wire up one virtual speaker, with decode
/// coefficients computed offline for the desired decoding scheme
pub struct SpeakerSpec {
    pub coefficients: [f32; 4],
    pub ir: SampleBuffer,
    pub ir_samplerate: f32,
    pub gain: f32,
}

/// assemble the rendering pipeline, returning the controls for the
/// control thread and the playhead for the render thread
pub fn init_renderer<const BUFSIZE: usize>(
    specs: Vec<SpeakerSpec>,
    correction_gains: [f32; 4],
    samplerate: f32,
) -> Result<(RendererControls, RendererPlayhead<BUFSIZE>), Error> {
    let (tx, rx): (Sender<ControlMessage>, Receiver<ControlMessage>) =
        crossbeam::channel::bounded(256);

    let now = Arc::new(AtomicCell::<f64>::new(0.0));

    let mut playhead = RendererPlayhead::<BUFSIZE>::new(correction_gains, samplerate, &now, rx);

    for (idx, spec) in specs.into_iter().enumerate() {
        // resample the ir if it doesn't match the renderer ...
        let ir = if spec.ir_samplerate != samplerate {
            resample_buffer(&spec.ir, spec.ir_samplerate as usize, samplerate as usize)?
        } else {
            spec.ir
        };
        playhead.add_speaker(spec.coefficients, &ir, spec.gain)?;
        debug!("registered virtual speaker {} ({} ir frames)", idx, ir.frames());
    }

    let controls = RendererControls::new(samplerate, &now, tx);

    Ok((controls, playhead))
}

fn resample_buffer(buffer: &SampleBuffer, from: usize, to: usize) -> Result<SampleBuffer, Error> {
    Ok(match buffer {
        SampleBuffer::Mono(samples) => SampleBuffer::Mono(resample_channel(samples, from, to)?),
        SampleBuffer::Stereo(l, r) => SampleBuffer::Stereo(
            resample_channel(l, from, to)?,
            resample_channel(r, from, to)?,
        ),
    })
}

fn resample_channel(samples: &[f32], from: usize, to: usize) -> Result<Vec<f32>, Error> {
    // zero-pad for resampling blocks
    let mut padded = samples.to_vec();
    if padded.len() % 1024 > 0 {
        let diff = 1024 - (padded.len() % 1024);
        padded.append(&mut vec![0.0; diff]);
    }

    let mut resampler = FftFixedIn::<f32>::new(from, to, 1024, 1, 1);

    let mut resampled: Vec<f32> = Vec::new();
    for chunk in padded.chunks(1024) {
        let mut waves_out = resampler
            .process(&[chunk.to_vec()])
            .map_err(|_| Error::Resample)?;
        resampled.append(&mut waves_out[0]);
    }

    Ok(resampled)
}
