/// Perspective projection and viewport mapping
use nalgebra::{Point3, Vector4};

use crate::transform::{Matrix4x4, Transform};

/// Near clipping plane distance
pub const Z_NEAR: f32 = 5.0;
/// Far clipping plane distance
pub const Z_FAR: f32 = 60.0;

/// Off-center perspective projection from the six frustum planes.
///
/// Returns a fresh matrix; nothing is composed with an existing transform.
pub fn frustum(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Matrix4x4 {
    let mut m = Transform::identity();
    let delta_x = r - l;
    let delta_y = t - b;
    let delta_z = f - n;

    m[0] = (2.0 * n) / delta_x;
    m[5] = (2.0 * n) / delta_y;
    m[8] = (r + l) / delta_x;
    m[9] = (t + b) / delta_y;
    m[10] = -(f + n) / delta_z;
    m[11] = -1.0;
    m[14] = -(2.0 * f * n) / delta_z;
    m[15] = 0.0;
    m
}

/// Camera configuration for 3D rendering
///
/// Tracks the viewport size and the projection derived from it. The frustum
/// spans `[-1, 1]` horizontally and keeps the viewport's aspect vertically.
#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    projection: Matrix4x4,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            width,
            height,
            projection: Transform::identity(),
        };
        camera.configure(width, height);
        camera
    }

    /// Adopt a new viewport size and rebuild the projection.
    pub fn configure(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);

        let h = self.height as f32 / self.width as f32;
        self.projection = frustum(-1.0, 1.0, -h, h, Z_NEAR, Z_FAR);
        log::debug!("viewport {}x{}, frustum half-height {:.3}", self.width, self.height, h);
    }

    pub fn projection_matrix(&self) -> &Matrix4x4 {
        &self.projection
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Project a point through a model-view-projection matrix to viewport space.
    ///
    /// Returns `(x, y, depth)` with `y` growing downwards and depth in NDC
    /// (`-1` near, `1` far), or `None` when the point is behind the eye.
    pub fn project_to_screen(
        point: &Point3<f32>,
        model_view_projection: &Matrix4x4,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = model_view_projection * Vector4::new(point.x, point.y, point.z, 1.0);

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(400, 400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frustum_elements() {
        let m = frustum(-1.0, 1.0, -1.0, 1.0, 5.0, 60.0);
        assert!((m[0] - 5.0).abs() < 1e-6);
        assert!((m[5] - 5.0).abs() < 1e-6);
        assert!((m[10] - (-65.0 / 55.0)).abs() < 1e-6);
        assert_eq!(m[11], -1.0);
        assert!((m[14] - (-600.0 / 55.0)).abs() < 1e-5);
        assert_eq!(m[15], 0.0);
        assert_eq!(m[8], 0.0);
        assert_eq!(m[9], 0.0);
    }

    #[test]
    fn test_off_center_frustum() {
        let m = frustum(0.0, 2.0, -1.0, 3.0, 1.0, 10.0);
        assert!((m[8] - 1.0).abs() < 1e-6);
        assert!((m[9] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 400);
        assert_eq!(camera.viewport(), (800, 400));
        // h = 0.5, so m[5] = 2n / 2h = 10
        assert!((camera.projection_matrix()[5] - 10.0).abs() < 1e-5);
        assert!((camera.projection_matrix()[0] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_near_plane_maps_to_minus_one() {
        let camera = Camera::new(400, 400);
        let mvp = *camera.projection_matrix();

        let (x, y, depth) =
            Camera::project_to_screen(&Point3::new(0.0, 0.0, -Z_NEAR), &mvp, 400, 400).unwrap();
        assert!((x - 200.0).abs() < 1e-3);
        assert!((y - 200.0).abs() < 1e-3);
        assert!((depth + 1.0).abs() < 1e-5);

        let (_, _, far) =
            Camera::project_to_screen(&Point3::new(0.0, 0.0, -Z_FAR), &mvp, 400, 400).unwrap();
        assert!((far - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_behind_eye_is_rejected() {
        let camera = Camera::default();
        let mvp = *camera.projection_matrix();
        assert!(Camera::project_to_screen(&Point3::new(0.0, 0.0, 1.0), &mvp, 400, 400).is_none());
    }
}
