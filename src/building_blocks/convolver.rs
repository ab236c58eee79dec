use chfft::RFft1D;
use num_complex::*;

/**
 * Uniform partitioned block convolver (UPOLS, following Wefers, 2014).
 *
 * The impulse response is cut into BUFSIZE-sample partitions whose
 * spectra are precomputed once; per block, one forward FFT feeds a
 * frequency delay line that is multiply-accumulated against the
 * partition spectra. BUFSIZE must be a power of two.
 */
pub struct PartitionedConvolver<const BUFSIZE: usize> {
    ir_frames: usize,
    sub_spectra: Vec<Vec<Complex<f32>>>,
    frequency_delay_line: Vec<Vec<Complex<f32>>>,
    fdl_idx: usize,
    output_accumulator: Vec<Complex<f32>>,
    fft: RFft1D<f32>,
    tmp_in: Vec<f32>,
    remainder: [f32; BUFSIZE],
}

impl<const BUFSIZE: usize> PartitionedConvolver<BUFSIZE> {
    /// precompute the partition spectra for the given impulse response.
    /// the response is zero-padded to a whole number of partitions.
    pub fn from_ir(ir: &[f32]) -> Self {
        let mut padded_len = ir.len().max(BUFSIZE);
        if !padded_len.is_power_of_two() {
            padded_len = padded_len.next_power_of_two();
        }
        let num_partitions = padded_len / BUFSIZE;

        let mut padded = ir.to_vec();
        padded.resize(padded_len, 0.0);

        let mut fft = RFft1D::<f32>::new(BUFSIZE * 2);

        let mut sub_spectra = Vec::with_capacity(num_partitions);
        let mut workbuf = vec![0.0; BUFSIZE * 2];
        for p in 0..num_partitions {
            workbuf[..BUFSIZE].copy_from_slice(&padded[p * BUFSIZE..(p + 1) * BUFSIZE]);
            sub_spectra.push(fft.forward(&workbuf));
        }

        PartitionedConvolver {
            ir_frames: ir.len(),
            sub_spectra,
            frequency_delay_line: vec![vec![Complex::new(0.0, 0.0); BUFSIZE + 1]; num_partitions],
            fdl_idx: 0,
            output_accumulator: vec![Complex::new(0.0, 0.0); BUFSIZE + 1],
            fft,
            tmp_in: vec![0.0; BUFSIZE * 2],
            remainder: [0.0; BUFSIZE],
        }
    }

    /// length of the original (unpadded) impulse response
    pub fn ir_frames(&self) -> usize {
        self.ir_frames
    }

    pub fn convolve(&mut self, input: [f32; BUFSIZE]) -> [f32; BUFSIZE] {
        // assemble the fft input from the previous and the current block
        self.tmp_in[..BUFSIZE].copy_from_slice(&self.remainder);
        self.tmp_in[BUFSIZE..].copy_from_slice(&input);

        self.frequency_delay_line[self.fdl_idx] = self.fft.forward(&self.tmp_in);

        for c in self.output_accumulator.iter_mut() {
            c.re = 0.0;
            c.im = 0.0;
        }

        // walk the delay line backwards, oldest spectrum meets the
        // latest partition
        let mut current_idx = self.fdl_idx;
        for spectrum in self.sub_spectra.iter() {
            for (acc, (ir_bin, in_bin)) in self
                .output_accumulator
                .iter_mut()
                .zip(spectrum.iter().zip(self.frequency_delay_line[current_idx].iter()))
            {
                *acc += ir_bin * in_bin;
            }
            current_idx = if current_idx == 0 {
                self.frequency_delay_line.len() - 1
            } else {
                current_idx - 1
            };
        }

        self.fdl_idx += 1;
        if self.fdl_idx >= self.frequency_delay_line.len() {
            self.fdl_idx = 0;
        }

        let tmp_out = self.fft.backward(&self.output_accumulator);

        // keep the valid second half, scrap the aliased rest
        self.remainder = input;
        let mut outarr = [0.0; BUFSIZE];
        outarr.copy_from_slice(&tmp_out[BUFSIZE..]);
        outarr
    }
}

// TEST TEST TEST
#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_impulse_response_convolution_is_identity() {
        let mut ir = vec![0.0; 128];
        ir[0] = 1.0;

        let mut signal_in = [0.0; 128];

        let mut conv = PartitionedConvolver::<128>::from_ir(&ir);

        let mut dev_accum = 0.0;

        for b in 0..100 {
            for i in 0..128 {
                let pi_idx = ((b * 128 + i) as f32) * PI;
                signal_in[i] = ((220.0 / 44100.0) * pi_idx).sin();
                signal_in[i] += ((432.0 / 44100.0) * pi_idx).sin();
                signal_in[i] += ((648.0 / 44100.0) * pi_idx).sin();
            }
            let signal_out = conv.convolve(signal_in);
            for i in 0..128 {
                dev_accum += (signal_out[i] - signal_in[i]) * (signal_out[i] - signal_in[i]);
            }
        }

        assert_approx_eq::assert_approx_eq!(dev_accum / (100.0 * 128.0), 0.0, 0.00001);
    }

    #[test]
    fn test_unit_impulse_input_reproduces_the_ir() {
        // ir longer than one block, so the delay line has to work
        let mut ir = vec![0.0; 300];
        for (i, tap) in ir.iter_mut().enumerate() {
            *tap = 1.0 / (i + 1) as f32;
        }

        let mut conv = PartitionedConvolver::<64>::from_ir(&ir);
        assert!(conv.ir_frames() == 300);

        let mut impulse = [0.0; 64];
        impulse[0] = 1.0;

        let mut out = Vec::new();
        let mut tail = conv.convolve(impulse);
        out.extend_from_slice(&tail);
        for _ in 0..7 {
            tail = conv.convolve([0.0; 64]);
            out.extend_from_slice(&tail);
        }

        for i in 0..300 {
            assert_approx_eq::assert_approx_eq!(out[i], ir[i], 0.0001);
        }
        for i in 300..out.len() {
            assert_approx_eq::assert_approx_eq!(out[i], 0.0, 0.0001);
        }
    }

    #[test]
    fn test_short_ir_is_zero_padded() {
        let ir = [0.5, 0.25, 0.125];
        let mut conv = PartitionedConvolver::<16>::from_ir(&ir);

        let mut impulse = [0.0; 16];
        impulse[0] = 1.0;
        let out = conv.convolve(impulse);

        assert_approx_eq::assert_approx_eq!(out[0], 0.5, 0.0001);
        assert_approx_eq::assert_approx_eq!(out[1], 0.25, 0.0001);
        assert_approx_eq::assert_approx_eq!(out[2], 0.125, 0.0001);
        for i in 3..16 {
            assert_approx_eq::assert_approx_eq!(out[i], 0.0, 0.0001);
        }
    }
}
