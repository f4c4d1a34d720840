/// 4x4 transformation matrices and view rotation state
///
/// Matrices are `nalgebra::Matrix4<f32>`, stored column-major, so
/// `as_slice()` yields the 16 floats a shader uniform expects.
use nalgebra::Matrix4;

pub type Matrix4x4 = Matrix4<f32>;

/// Rotation state around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Degrees to radians the way every caller of `Transform::rotate` converts.
pub fn degrees(angle: f32) -> f32 {
    2.0 * std::f32::consts::PI * angle / 360.0
}

/// Matrix operations used to place, project and light the gears.
///
/// The mutating operations compose in place: `multiply(m, n)` stores `m * n`,
/// so each `translate`/`rotate` call applies to vertices before everything
/// already folded into `m`.
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4x4 {
        Matrix4::identity()
    }

    /// `m := m * n`
    pub fn multiply(m: &mut Matrix4x4, n: &Matrix4x4) {
        let mut tmp = [0.0f32; 16];
        for (i, out) in tmp.iter_mut().enumerate() {
            let (col, row) = (i / 4, i % 4);
            for j in 0..4 {
                *out += m[j * 4 + row] * n[col * 4 + j];
            }
        }
        m.copy_from_slice(&tmp);
    }

    pub fn translate(m: &mut Matrix4x4, x: f32, y: f32, z: f32) {
        #[rustfmt::skip]
        let t = Matrix4::from_column_slice(&[
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            x,   y,   z,   1.0,
        ]);
        Self::multiply(m, &t);
    }

    /// Rotate `angle` radians about `(x, y, z)`.
    ///
    /// The axis is used as given; a non-unit axis yields a scaled matrix.
    pub fn rotate(m: &mut Matrix4x4, angle: f32, x: f32, y: f32, z: f32) {
        let (s, c) = angle.sin_cos();
        let k = 1.0 - c;
        #[rustfmt::skip]
        let r = Matrix4::from_column_slice(&[
            x * x * k + c,     y * x * k + z * s, x * z * k - y * s, 0.0,
            x * y * k - z * s, y * y * k + c,     y * z * k + x * s, 0.0,
            x * z * k + y * s, y * z * k - x * s, z * z * k + c,     0.0,
            0.0,               0.0,               0.0,               1.0,
        ]);
        Self::multiply(m, &r);
    }

    pub fn transpose(m: &mut Matrix4x4) {
        m.transpose_mut();
    }

    /// Invert a rotation + translation matrix in place.
    ///
    /// Only valid for rigid transforms: the rotation block is inverted by
    /// transposing it. Any other input (scale, shear, a projection) produces
    /// a wrong result without complaint; see [`Transform::is_rigid`].
    pub fn invert(m: &mut Matrix4x4) {
        let mut t = Self::identity();
        t[12] = -m[12];
        t[13] = -m[13];
        t[14] = -m[14];

        m[12] = 0.0;
        m[13] = 0.0;
        m[14] = 0.0;
        Self::transpose(m);

        // inv(m) = inv(r) * inv(t)
        Self::multiply(m, &t);
    }

    /// Whether `m` is a rotation followed by a translation, within `1e-3`.
    pub fn is_rigid(m: &Matrix4x4) -> bool {
        const TOLERANCE: f32 = 1e-3;

        let bottom = [m[3], m[7], m[11], m[15] - 1.0];
        if bottom.iter().any(|v| v.abs() > TOLERANCE) {
            return false;
        }

        let r = m.fixed_view::<3, 3>(0, 0);
        let gram = r.transpose() * r;
        (gram - nalgebra::Matrix3::identity()).amax() <= TOLERANCE
    }

    /// Create a rotation matrix from a rotation state, X then Y then Z.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4x4 {
        let mut m = Self::identity();
        Self::rotate(&mut m, degrees(rotation.x), 1.0, 0.0, 0.0);
        Self::rotate(&mut m, degrees(rotation.y), 0.0, 1.0, 0.0);
        Self::rotate(&mut m, degrees(rotation.z), 0.0, 0.0, 1.0);
        m
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(projection: &Matrix4x4, model_view: &Matrix4x4) -> Matrix4x4 {
        let mut mvp = *projection;
        Self::multiply(&mut mvp, model_view);
        mvp
    }

    /// Inverse-transpose of the model-view rotation, for transforming normals.
    pub fn normal_matrix(model_view: &Matrix4x4) -> Matrix4x4 {
        let mut normal = *model_view;
        normal[12] = 0.0;
        normal[13] = 0.0;
        normal[14] = 0.0;
        debug_assert!(Self::is_rigid(&normal), "normal matrix of a non-rigid transform");
        Self::invert(&mut normal);
        Self::transpose(&mut normal);
        normal
    }
}
