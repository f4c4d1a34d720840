/// Gears Core Library - Gear geometry and transformation logic
///
/// This library provides the stateless core of the gears demo: procedural
/// gear meshes, the 4x4 matrix pipeline that places, projects and lights
/// them, and the scene that composes a frame for any rendering sink.

pub mod error;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod timing;
pub mod transform;

// Re-export commonly used types
pub use error::{GearError, GearResult};
pub use geometry::{build_gear, GearMesh, GearSpec, StripWriter, Triangle, Vertex};
pub use projection::{frustum, Camera};
pub use scene::{Gear, GearUniforms, RenderSink, Scene, ViewState};
pub use timing::{FpsCounter, FpsReport, FrameTimer};
pub use transform::{Matrix4x4, RotationState, Transform};
