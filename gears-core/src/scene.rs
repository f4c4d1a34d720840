/// The gears scene: view state, gear instances and per-frame composition
///
/// `Scene` owns everything a frame needs. The host advances it with a time
/// delta, feeds it pointer drags and viewport changes, and asks it to draw
/// into a [`RenderSink`].
use nalgebra::{Vector3, Vector4};

use crate::error::GearResult;
use crate::geometry::{GearMesh, GearSpec};
use crate::projection::Camera;
use crate::transform::{degrees, Matrix4x4, RotationState, Transform};

/// Gear rotation speed in degrees per second.
pub const ROTATION_SPEED: f32 = 70.0;
/// The gear angle wraps back by this many degrees.
pub const ANGLE_WRAP: f32 = 3600.0;
/// Degrees of view rotation per pixel of pointer drag.
pub const DRAG_SENSITIVITY: f32 = 0.5;
/// Distance from the eye to the scene origin.
pub const VIEW_DISTANCE: f32 = 40.0;
/// Direction of the scene's directional light.
pub const LIGHT_SOURCE_POSITION: [f32; 4] = [5.0, 5.0, 10.0, 1.0];
pub const AMBIENT: f32 = 0.2;

pub const RED: [f32; 4] = [0.8, 0.1, 0.0, 1.0];
pub const GREEN: [f32; 4] = [0.0, 0.8, 0.2, 1.0];
pub const BLUE: [f32; 4] = [0.2, 0.2, 1.0, 1.0];

/// View rotation and gear angle, mutated by input and by the frame clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// View rotation about X, Y and Z in degrees
    pub rotation: RotationState,
    /// Current gear rotation angle in degrees
    pub angle: f32,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            rotation: RotationState::new(20.0, 30.0, 0.0),
            angle: 0.0,
        }
    }

    /// Advance the gear angle by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.angle += ROTATION_SPEED * dt;
        if self.angle > ANGLE_WRAP {
            self.angle -= ANGLE_WRAP;
        }
    }

    /// Apply a pointer drag of `(dx, dy)` pixels to the view rotation.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.rotation
            .rotate(dy * DRAG_SENSITIVITY, dx * DRAG_SENSITIVITY, 0.0);
    }

    /// Camera transform: pull back along Z, then rotate X, Y, Z.
    pub fn view_matrix(&self) -> Matrix4x4 {
        let mut view = Transform::identity();
        Transform::translate(&mut view, 0.0, 0.0, -VIEW_DISTANCE);
        Transform::multiply(&mut view, &Transform::rotation_matrix(&self.rotation));
        view
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// One gear placed in the scene.
///
/// Its angle is `angle_scale * angle + angle_offset` degrees about Z.
#[derive(Debug, Clone)]
pub struct Gear {
    pub mesh: GearMesh,
    pub x: f32,
    pub y: f32,
    pub angle_scale: f32,
    pub angle_offset: f32,
    pub color: [f32; 4],
}

impl Gear {
    pub fn new(spec: GearSpec, x: f32, y: f32, color: [f32; 4]) -> GearResult<Self> {
        Ok(Self {
            mesh: spec.build()?,
            x,
            y,
            angle_scale: 1.0,
            angle_offset: 0.0,
            color,
        })
    }

    pub fn with_phase(mut self, angle_scale: f32, angle_offset: f32) -> Self {
        self.angle_scale = angle_scale;
        self.angle_offset = angle_offset;
        self
    }

    pub fn angle(&self, scene_angle: f32) -> f32 {
        self.angle_scale * scene_angle + self.angle_offset
    }

    /// Translate to the gear's position and spin it about Z.
    pub fn model_view(&self, view: &Matrix4x4, scene_angle: f32) -> Matrix4x4 {
        let mut model_view = *view;
        Transform::translate(&mut model_view, self.x, self.y, 0.0);
        Transform::rotate(&mut model_view, degrees(self.angle(scene_angle)), 0.0, 0.0, 1.0);
        model_view
    }
}

/// Per-draw uniform values handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearUniforms {
    pub model_view_projection: Matrix4x4,
    pub normal_matrix: Matrix4x4,
    pub light_source_position: [f32; 4],
    pub material_color: [f32; 4],
}

impl GearUniforms {
    /// Gouraud color of a vertex normal: ambient plus diffuse, alpha 1.
    pub fn shade(&self, normal: &Vector3<f32>) -> [f32; 4] {
        let n = self.normal_matrix * Vector4::new(normal.x, normal.y, normal.z, 1.0);
        let n = Vector3::new(n.x, n.y, n.z).normalize();

        let [lx, ly, lz, _] = self.light_source_position;
        let l = Vector3::new(lx, ly, lz).normalize();

        let diffuse = n.dot(&l).max(0.0);
        let intensity = AMBIENT + diffuse;
        let [r, g, b, _] = self.material_color;
        [intensity * r, intensity * g, intensity * b, 1.0]
    }
}

/// Consumer of gear draws: one triangle-strip draw per call.
pub trait RenderSink {
    fn draw_gear(&mut self, mesh: &GearMesh, uniforms: &GearUniforms);
}

/// Three interlocking gears seen through a perspective camera.
#[derive(Debug, Clone)]
pub struct Scene {
    pub view: ViewState,
    pub camera: Camera,
    gears: Vec<Gear>,
}

impl Scene {
    /// Build the classic red, green and blue gears.
    pub fn new(width: u32, height: u32) -> GearResult<Self> {
        let gears = vec![
            Gear::new(GearSpec::new(1.0, 4.0, 1.0, 20, 0.7), -3.0, -2.0, RED)?,
            Gear::new(GearSpec::new(0.5, 2.0, 2.0, 10, 0.7), 3.1, -2.0, GREEN)?
                .with_phase(-2.0, -9.0),
            Gear::new(GearSpec::new(1.3, 2.0, 0.5, 10, 0.7), -3.1, 4.2, BLUE)?
                .with_phase(-2.0, -25.0),
        ];
        log::info!(
            "created {} gears ({} vertices)",
            gears.len(),
            gears.iter().map(|g| g.mesh.vertex_count()).sum::<usize>()
        );

        Ok(Self {
            view: ViewState::new(),
            camera: Camera::new(width, height),
            gears,
        })
    }

    pub fn gears(&self) -> &[Gear] {
        &self.gears
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.configure(width, height);
    }

    pub fn update(&mut self, dt: f32) {
        self.view.advance(dt);
    }

    /// Matrices and color for one gear at the current view state.
    pub fn uniforms(&self, gear: &Gear, view: &Matrix4x4) -> GearUniforms {
        let model_view = gear.model_view(view, self.view.angle);
        GearUniforms {
            model_view_projection: Transform::mvp_matrix(self.camera.projection_matrix(), &model_view),
            normal_matrix: Transform::normal_matrix(&model_view),
            light_source_position: LIGHT_SOURCE_POSITION,
            material_color: gear.color,
        }
    }

    /// Issue one draw per gear.
    pub fn draw<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        let view = self.view.view_matrix();
        for gear in &self.gears {
            let uniforms = self.uniforms(gear, &view);
            sink.draw_gear(&gear.mesh, &uniforms);
        }
    }
}
