// generic second-order section
#[derive(Clone, Copy, Default)]
pub struct SosCoefs {
    pub a1: f32,
    pub a2: f32,
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
}

#[derive(Clone, Copy, Default)]
pub struct SosDelay {
    pub del1: f32,
    pub del2: f32,
}

#[inline(always)]
pub fn process_sos_sample(coefs: &SosCoefs, delay: &mut SosDelay, sample: f32) -> f32 {
    let intermediate = sample + ((-1.0 * coefs.a1) * delay.del1) + ((-1.0 * coefs.a2) * delay.del2);
    let out = (coefs.b0 * intermediate) + (coefs.b1 * delay.del1) + (coefs.b2 * delay.del2);
    delay.del2 = delay.del1;
    delay.del1 = intermediate;
    out
}

pub fn process_sos_block<const BUFSIZE: usize>(
    coefs: &SosCoefs,
    delay: &mut SosDelay,
    block: [f32; BUFSIZE],
) -> [f32; BUFSIZE] {
    let mut out_buf: [f32; BUFSIZE] = [0.0; BUFSIZE];
    for i in 0..BUFSIZE {
        out_buf[i] = process_sos_sample(coefs, delay, block[i]);
    }
    out_buf
}
