use super::Extras;

/// A node in the scene graph. Children, mesh, camera, and skin references
/// live as graph edges (`"children"`, `"mesh"`, `"camera"`, `"skin"`), not
/// as fields here.
#[derive(Clone, Debug)]
pub struct Node {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    /// When set, overrides TRS as the local transform. `setMatrix`
    /// decomposes a matrix into TRS and clears this instead of storing it,
    /// matching the glTF rule that `matrix` and TRS are mutually exclusive
    /// on write.
    pub matrix: Option<[f32; 16]>,
    pub weights: Vec<f32>,
    pub name: Option<String>,
    pub extras: Extras,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
            matrix: None,
            weights: Vec::new(),
            name: None,
            extras: None,
        }
    }
}

impl Node {
    /// The node's local transform as a column-major 4x4 matrix.
    pub fn local_matrix(&self) -> [f32; 16] {
        if let Some(m) = self.matrix {
            return m;
        }
        trs_to_matrix(self.translation, self.rotation, self.scale)
    }

    /// Decomposes `matrix` into translation/rotation/scale and adopts it
    /// as the node's TRS, clearing any stored matrix override.
    pub fn set_matrix(&mut self, matrix: [f32; 16]) {
        let (t, r, s) = decompose(matrix);
        self.translation = t;
        self.rotation = r;
        self.scale = s;
        self.matrix = None;
    }
}

fn trs_to_matrix(t: [f32; 3], r: [f32; 4], s: [f32; 3]) -> [f32; 16] {
    let [x, y, z, w] = r;
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    let m00 = (1.0 - (yy + zz)) * s[0];
    let m01 = (xy + wz) * s[0];
    let m02 = (xz - wy) * s[0];
    let m10 = (xy - wz) * s[1];
    let m11 = (1.0 - (xx + zz)) * s[1];
    let m12 = (yz + wx) * s[1];
    let m20 = (xz + wy) * s[2];
    let m21 = (yz - wx) * s[2];
    let m22 = (1.0 - (xx + yy)) * s[2];

    [
        m00, m01, m02, 0.0, m10, m11, m12, 0.0, m20, m21, m22, 0.0, t[0], t[1], t[2], 1.0,
    ]
}

/// Decomposes a column-major 4x4 matrix into translation, rotation
/// (quaternion), and scale, assuming no shear.
fn decompose(m: [f32; 16]) -> ([f32; 3], [f32; 4], [f32; 3]) {
    let translation = [m[12], m[13], m[14]];

    let col = |i: usize| [m[i * 4], m[i * 4 + 1], m[i * 4 + 2]];
    let len = |v: [f32; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();

    let (c0, c1, c2) = (col(0), col(1), col(2));
    let mut sx = len(c0);
    let sy = len(c1);
    let sz = len(c2);

    let det = m[0] * (m[5] * m[10] - m[6] * m[9]) - m[1] * (m[4] * m[10] - m[6] * m[8])
        + m[2] * (m[4] * m[9] - m[5] * m[8]);
    if det < 0.0 {
        sx = -sx;
    }
    let scale = [sx, sy, sz];

    let inv = |v: f32| if v != 0.0 { 1.0 / v } else { 0.0 };
    let r00 = c0[0] * inv(sx);
    let r10 = c0[1] * inv(sx);
    let r20 = c0[2] * inv(sx);
    let r01 = c1[0] * inv(sy);
    let r11 = c1[1] * inv(sy);
    let r21 = c1[2] * inv(sy);
    let r02 = c2[0] * inv(sz);
    let r12 = c2[1] * inv(sz);
    let r22 = c2[2] * inv(sz);

    let trace = r00 + r11 + r22;
    let rotation = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [(r21 - r12) / s, (r02 - r20) / s, (r10 - r01) / s, s / 4.0]
    } else if r00 > r11 && r00 > r22 {
        let s = (1.0 + r00 - r11 - r22).sqrt() * 2.0;
        [s / 4.0, (r01 + r10) / s, (r02 + r20) / s, (r21 - r12) / s]
    } else if r11 > r22 {
        let s = (1.0 + r11 - r00 - r22).sqrt() * 2.0;
        [(r01 + r10) / s, s / 4.0, (r12 + r21) / s, (r02 - r20) / s]
    } else {
        let s = (1.0 + r22 - r00 - r11).sqrt() * 2.0;
        [(r02 + r20) / s, (r12 + r21) / s, s / 4.0, (r10 - r01) / s]
    };

    (translation, rotation, scale)
}

/// Multiplies two column-major 4x4 matrices, `a * b`.
pub fn mul_matrix(a: [f32; 16], b: [f32; 16]) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    for col in 0..4 {
        for row in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[k * 4 + row] * b[col * 4 + k];
            }
            out[col * 4 + row] = sum;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_trs_is_identity_matrix() {
        let node = Node::default();
        let m = node.local_matrix();
        let identity = [
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ];
        for (a, b) in m.iter().zip(identity.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn set_matrix_round_trips_translation_and_scale() {
        let mut node = Node::default();
        let m = [
            2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 4.0, 0.0, 1.0, 2.0, 3.0, 1.0,
        ];
        node.set_matrix(m);
        assert_eq!(node.translation, [1.0, 2.0, 3.0]);
        assert!((node.scale[0] - 2.0).abs() < 1e-5);
        assert!((node.scale[1] - 3.0).abs() < 1e-5);
        assert!((node.scale[2] - 4.0).abs() < 1e-5);
    }
}
