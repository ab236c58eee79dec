use crate::building_blocks::filters::sos::{process_sos_sample, SosCoefs, SosDelay};

/// matched pole pair, crossover around 700 Hz at 44.1 kHz
pub const CROSSOVER_LPF: SosCoefs = SosCoefs {
    a1: -1.9029109,
    a2: 0.90526748,
    b0: 0.00058914319,
    b1: 0.0011782864,
    b2: 0.00058914319,
};

pub const CROSSOVER_HPF: SosCoefs = SosCoefs {
    a1: -1.9029109,
    a2: 0.90526748,
    b0: 0.95204461,
    b1: -1.9040892,
    b2: 0.95204461,
};

/**
 * a phase-matched two-band crossover for b-format streams
 *
 * splits each of the 4 channels into a low-passed and a high-passed
 * band, scales the high band with a per-channel correction gain and
 * recombines. both filters share the same denominator, so the two
 * bands stay time- and phase-aligned and the recombination doesn't
 * smear transients the way a plain shelving correction would.
 */
pub struct PhaseMatchedFilter<const BUFSIZE: usize> {
    lp_coefs: SosCoefs,
    hp_coefs: SosCoefs,
    lp_delays: [SosDelay; 4],
    hp_delays: [SosDelay; 4],
    // signed correction gains for the high band, one per W/X/Y/Z
    gains: [f32; 4],
}

impl<const BUFSIZE: usize> PhaseMatchedFilter<BUFSIZE> {
    /// crossover with the built-in 44.1 kHz pole pair
    pub fn new(coefficients: [f32; 4]) -> Self {
        PhaseMatchedFilter::with_coefs(CROSSOVER_LPF, CROSSOVER_HPF, coefficients)
    }

    pub fn with_coefs(lp: SosCoefs, hp: SosCoefs, coefficients: [f32; 4]) -> Self {
        // the shared pole set is what keeps the bands phase-aligned
        debug_assert!(lp.a1 == hp.a1 && lp.a2 == hp.a2);

        let mut filter = PhaseMatchedFilter {
            lp_coefs: lp,
            hp_coefs: hp,
            lp_delays: [SosDelay::default(); 4],
            hp_delays: [SosDelay::default(); 4],
            gains: [0.0; 4],
        };
        filter.set_correction_gains(coefficients);
        filter
    }

    /// replace the high-band correction gains (one per W/X/Y/Z).
    /// inverting the sign is necessary as the low-passed and
    /// high-passed portions are out of phase after the filtering.
    pub fn set_correction_gains(&mut self, coefficients: [f32; 4]) {
        for ch in 0..4 {
            self.gains[ch] = -1.0 * coefficients[ch];
        }
    }

    pub fn process_block(&mut self, input: [[f32; BUFSIZE]; 4]) -> [[f32; BUFSIZE]; 4] {
        let mut out = [[0.0; BUFSIZE]; 4];

        for ch in 0..4 {
            for i in 0..BUFSIZE {
                let low = process_sos_sample(&self.lp_coefs, &mut self.lp_delays[ch], input[ch][i]);
                let high =
                    process_sos_sample(&self.hp_coefs, &mut self.hp_delays[ch], input[ch][i]);
                out[ch][i] = low + self.gains[ch] * high;
            }
        }

        out
    }
}
