/**
 * soundfield rotator for first-order b-format streams
 *
 * remaps the native W/X/Y/Z channel order into right-handed world
 * space (world_x = -y, world_y = z, world_z = -x), applies a 3x3
 * rotation to the velocity components, and maps back. W is invariant
 * under rotation and passes through untouched.
 */
pub struct Rotator<const BUFSIZE: usize> {
    // row-major, orthonormality is the caller's contract
    matrix: [f32; 9],
}

impl<const BUFSIZE: usize> Default for Rotator<BUFSIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUFSIZE: usize> Rotator<BUFSIZE> {
    pub fn new() -> Self {
        Rotator {
            matrix: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// replace the rotation matrix (row-major).
    /// takes effect on the very next sample, no crossfade.
    pub fn set_rotation_matrix(&mut self, matrix: [f32; 9]) {
        self.matrix = matrix;
    }

    pub fn process_block(&mut self, input: [[f32; BUFSIZE]; 4]) -> [[f32; BUFSIZE]; 4] {
        let mut out = [[0.0; BUFSIZE]; 4];
        let m = &self.matrix;

        out[0] = input[0];

        for i in 0..BUFSIZE {
            // audio space to world space
            let wx = -input[2][i];
            let wy = input[3][i];
            let wz = -input[1][i];

            // |x'|   | m0 m3 m6 |   |x|
            // |y'| = | m1 m4 m7 | * |y|
            // |z'|   | m2 m5 m8 |   |z|
            let rx = m[0] * wx + m[3] * wy + m[6] * wz;
            let ry = m[1] * wx + m[4] * wy + m[7] * wz;
            let rz = m[2] * wx + m[5] * wy + m[8] * wz;

            // world space back to audio space
            out[1][i] = -rz;
            out[2][i] = -rx;
            out[3][i] = ry;
        }

        out
    }
}

// TEST TEST TEST
#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;

    fn mat_mul(a: [f32; 9], b: [f32; 9]) -> [f32; 9] {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                for k in 0..3 {
                    out[row * 3 + col] += a[row * 3 + k] * b[k * 3 + col];
                }
            }
        }
        out
    }

    #[test]
    fn test_identity_rotation_is_exact_passthrough() {
        let mut rot = Rotator::<2>::new();
        rot.set_rotation_matrix([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        let input = [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [0.0, 0.0]];
        let out = rot.process_block(input);

        // bit-exact, not just approximate
        for ch in 0..4 {
            for i in 0..2 {
                assert!(out[ch][i] == input[ch][i]);
            }
        }
    }

    #[test]
    fn test_w_invariant_under_rotation() {
        let mut rot = Rotator::<4>::new();
        // 90 degrees about the vertical axis
        rot.set_rotation_matrix([0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let input = [
            [0.5, -0.25, 0.125, 1.0],
            [0.1, 0.2, 0.3, 0.4],
            [0.4, 0.3, 0.2, 0.1],
            [0.0, 1.0, 0.0, -1.0],
        ];
        let out = rot.process_block(input);
        for i in 0..4 {
            assert!(out[0][i] == input[0][i]);
        }
    }

    #[test]
    fn test_composed_rotation_matches_sequential_application() {
        let quarter = [0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let half = mat_mul(quarter, quarter);

        let input = [
            [0.0; 8],
            [1.0, 0.5, 0.25, 0.125, 0.0, -0.5, -0.25, -1.0],
            [0.3, 0.1, -0.3, 0.7, 0.0, 0.2, -0.9, 0.4],
            [0.0, 0.0, 1.0, -1.0, 0.5, 0.5, 0.0, 0.0],
        ];

        let mut seq = Rotator::<8>::new();
        seq.set_rotation_matrix(quarter);
        let first = seq.process_block(input);
        let twice = seq.process_block(first);

        let mut composed = Rotator::<8>::new();
        composed.set_rotation_matrix(half);
        let once = composed.process_block(input);

        for ch in 0..4 {
            for i in 0..8 {
                assert_approx_eq::assert_approx_eq!(once[ch][i], twice[ch][i], 0.00001);
            }
        }
    }
}
