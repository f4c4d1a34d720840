/// Procedural gear geometry
///
/// A gear is a toothed wheel extruded along Z and stored as a single run of
/// triangle strips. Independent strips are joined with degenerate restart
/// vertices so the whole solid can be drawn with one strip draw call.
use nalgebra::{Point2, Point3, Vector3};
use std::f32::consts::PI;

use crate::error::{GearError, GearResult};

/// Vertices emitted for the first tooth of a gear.
pub const VERTICES_PER_TOOTH: usize = 46;

/// Floats per vertex in the exported buffer (position then normal).
pub const GEAR_VERTEX_STRIDE: usize = 6;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    /// The six floats a vertex buffer expects: x, y, z, nx, ny, nz.
    pub fn to_array(&self) -> [f32; GEAR_VERTEX_STRIDE] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
        ]
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Twice the area of the triangle; zero for the restart triangles.
    pub fn doubled_area(&self) -> f32 {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        (v1 - v0).cross(&(v2 - v0)).norm()
    }

    pub fn is_degenerate(&self) -> bool {
        self.doubled_area() <= f32::EPSILON
    }
}

/// Geometric parameters of a gear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearSpec {
    /// Radius of the hole at the center
    pub inner_radius: f32,
    /// Radius at the center of the teeth
    pub outer_radius: f32,
    /// Extrusion depth along Z; faces sit at `±width / 2`
    pub width: f32,
    pub teeth: u32,
    pub tooth_depth: f32,
}

impl GearSpec {
    pub fn new(inner_radius: f32, outer_radius: f32, width: f32, teeth: u32, tooth_depth: f32) -> Self {
        Self {
            inner_radius,
            outer_radius,
            width,
            teeth,
            tooth_depth,
        }
    }

    /// Exact number of vertices `build` produces for this tooth count.
    ///
    /// Every tooth after the first carries two extra restart vertices.
    pub fn vertex_count(&self) -> usize {
        match self.teeth {
            0 => 0,
            teeth => VERTICES_PER_TOOTH + (VERTICES_PER_TOOTH + 2) * (teeth as usize - 1),
        }
    }

    fn validate(&self) -> GearResult<()> {
        if self.teeth == 0 {
            return Err(GearError::InvalidToothCount(self.teeth));
        }

        // Degenerate sizes still yield a well-formed mesh
        let dimensions = [
            ("inner_radius", self.inner_radius),
            ("outer_radius", self.outer_radius),
            ("width", self.width),
            ("tooth_depth", self.tooth_depth),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() {
                return Err(GearError::InvalidDimensions { name, value });
            }
        }

        Ok(())
    }

    pub fn build(&self) -> GearResult<GearMesh> {
        build_gear(
            self.inner_radius,
            self.outer_radius,
            self.width,
            self.teeth,
            self.tooth_depth,
        )
    }
}

/// An immutable gear solid stored as concatenated triangle strips.
///
/// Vertex order is load-bearing: it encodes the strip topology and the
/// restart boundaries between strips.
#[derive(Debug, Clone)]
pub struct GearMesh {
    spec: GearSpec,
    vertices: Vec<Vertex>,
}

impl GearMesh {
    pub fn spec(&self) -> &GearSpec {
        &self.spec
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Flattened vertex data, `GEAR_VERTEX_STRIDE` floats per vertex.
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Expand the strip into triangles with consistent winding.
    ///
    /// Odd triangles of a strip have their first two vertices swapped, and
    /// the zero-area triangles produced by restart vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices
            .windows(3)
            .enumerate()
            .map(|(i, w)| {
                if i % 2 == 0 {
                    Triangle::new(w[0], w[1], w[2])
                } else {
                    Triangle::new(w[1], w[0], w[2])
                }
            })
            .filter(|triangle| !triangle.is_degenerate())
    }
}

/// Cursor over a vertex buffer that emits independent strips.
///
/// Every strip except the first reserves two slots at its start; closing the
/// strip fills them with the last vertex of the previous strip and the first
/// vertex of the current one.
#[derive(Debug)]
pub struct StripWriter {
    vertices: Vec<Vertex>,
    strip_start: usize,
    normal: Vector3<f32>,
    half_width: f32,
}

impl StripWriter {
    pub fn new(width: f32, capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            strip_start: 0,
            normal: Vector3::zeros(),
            half_width: width * 0.5,
        }
    }

    /// Number of vertices written so far, restart slots included.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn start_strip(&mut self) {
        self.strip_start = self.vertices.len();
        if self.strip_start != 0 {
            let placeholder = Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
            self.vertices.push(placeholder);
            self.vertices.push(placeholder);
        }
    }

    pub fn end_strip(&mut self) {
        let start = self.strip_start;
        if start == 0 {
            return;
        }
        debug_assert!(
            self.vertices.len() > start + 2,
            "strip closed without emitting a vertex"
        );
        if let (Some(&previous), Some(&first)) =
            (self.vertices.get(start - 1), self.vertices.get(start + 2))
        {
            self.vertices[start] = previous;
            self.vertices[start + 1] = first;
        }
    }

    /// Normal carried by every vertex emitted until the next call.
    pub fn set_normal(&mut self, x: f32, y: f32, z: f32) {
        self.normal = Vector3::new(x, y, z);
    }

    /// Emit a profile point on the front (`sign = 1`) or back (`sign = -1`) face.
    pub fn emit_vertex(&mut self, point: Point2<f32>, sign: f32) {
        self.vertices.push(Vertex {
            position: Point3::new(point.x, point.y, sign * self.half_width),
            normal: self.normal,
        });
    }

    /// Emit a side quad between two profile points with the edge's 2D normal.
    pub fn emit_quad(&mut self, p1: Point2<f32>, p2: Point2<f32>) {
        self.set_normal(p1.y - p2.y, -(p1.x - p2.x), 0.0);
        self.emit_vertex(p1, -1.0);
        self.emit_vertex(p1, 1.0);
        self.emit_vertex(p2, -1.0);
        self.emit_vertex(p2, 1.0);
    }

    pub fn finish(self) -> Vec<Vertex> {
        self.vertices
    }
}

/// The seven profile points of one tooth.
///
/// Indices: 0/1 tip, 2/3 base circle at the tooth flanks, 4 root at the
/// sector start, 5 base circle at the sector end, 6 root at the sector end.
fn tooth_profile(r0: f32, r1: f32, r2: f32, sin: &[f32; 5], cos: &[f32; 5]) -> [Point2<f32>; 7] {
    let point = |r: f32, k: usize| Point2::new(r * cos[k], r * sin[k]);
    [
        point(r2, 1),
        point(r2, 2),
        point(r1, 0),
        point(r1, 3),
        point(r0, 0),
        point(r1, 4),
        point(r0, 4),
    ]
}

/// Create a gear wheel.
///
/// `inner_radius` is the radius of the hole at the center, `outer_radius` the
/// radius at the center of the teeth, `width` the extrusion depth and
/// `tooth_depth` the radial height of a tooth.
pub fn build_gear(
    inner_radius: f32,
    outer_radius: f32,
    width: f32,
    teeth: u32,
    tooth_depth: f32,
) -> GearResult<GearMesh> {
    let spec = GearSpec::new(inner_radius, outer_radius, width, teeth, tooth_depth);
    spec.validate()?;

    let r0 = inner_radius;
    let r1 = outer_radius - tooth_depth / 2.0;
    let r2 = outer_radius + tooth_depth / 2.0;

    let sector = 2.0 * PI / teeth as f32;
    let da = sector / 4.0;

    let expected = spec.vertex_count();
    let mut writer = StripWriter::new(width, expected);

    for i in 0..teeth {
        let base = i as f32 * sector;
        let mut sin = [0.0; 5];
        let mut cos = [0.0; 5];
        for k in 0..5 {
            let (s, c) = (base + da * k as f32).sin_cos();
            sin[k] = s;
            cos[k] = c;
        }

        let p = tooth_profile(r0, r1, r2, &sin, &cos);

        // Front face
        writer.start_strip();
        writer.set_normal(0.0, 0.0, 1.0);
        for point in p {
            writer.emit_vertex(point, 1.0);
        }
        writer.end_strip();

        // Back face
        writer.start_strip();
        writer.set_normal(0.0, 0.0, -1.0);
        for point in p {
            writer.emit_vertex(point, -1.0);
        }
        writer.end_strip();

        // Outer face, one quad per profile edge
        for (a, b) in [(0, 2), (1, 0), (3, 1), (5, 3)] {
            writer.start_strip();
            writer.emit_quad(p[a], p[b]);
            writer.end_strip();
        }

        // Inner face
        writer.start_strip();
        writer.set_normal(-cos[0], -sin[0], 0.0);
        writer.emit_vertex(p[4], -1.0);
        writer.emit_vertex(p[4], 1.0);
        writer.set_normal(-cos[4], -sin[4], 0.0);
        writer.emit_vertex(p[6], -1.0);
        writer.emit_vertex(p[6], 1.0);
        writer.end_strip();
    }

    debug_assert_eq!(writer.len(), expected, "gear vertex count mismatch");
    log::debug!("built gear with {} teeth: {} vertices", teeth, writer.len());

    Ok(GearMesh {
        spec,
        vertices: writer.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gear1() -> GearMesh {
        build_gear(1.0, 4.0, 1.0, 20, 0.7).unwrap()
    }

    #[test]
    fn test_vertex_count_formula() {
        for teeth in [1u32, 2, 3, 10, 20, 100] {
            let mesh = build_gear(1.0, 4.0, 1.0, teeth, 0.7).unwrap();
            assert_eq!(mesh.vertex_count(), 46 + 48 * (teeth as usize - 1));
            assert_eq!(mesh.vertex_count(), mesh.spec().vertex_count());
        }
    }

    #[test]
    fn test_first_vertex_is_front_face() {
        let mesh = gear1();
        assert_eq!(mesh.vertex_count(), 958);

        let first = mesh.vertices()[0];
        assert_eq!(first.position.z, 0.5);
        assert_eq!(first.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_zero_teeth_rejected() {
        let result = build_gear(1.0, 4.0, 1.0, 0, 0.7);
        assert_eq!(result.unwrap_err(), GearError::InvalidToothCount(0));
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        assert!(matches!(
            build_gear(1.0, f32::NAN, 1.0, 10, 0.7),
            Err(GearError::InvalidDimensions { name: "outer_radius", .. })
        ));
        assert!(matches!(
            build_gear(1.0, 4.0, f32::INFINITY, 10, 0.7),
            Err(GearError::InvalidDimensions { name: "width", .. })
        ));
    }

    #[test]
    fn test_zero_width_gear_is_flat() {
        let mesh = build_gear(1.0, 4.0, 0.0, 20, 0.7).unwrap();
        assert_eq!(mesh.vertex_count(), 958);
        assert!(mesh.vertices().iter().all(|v| v.position.z == 0.0));
    }

    #[test]
    fn test_vertices_lie_on_faces() {
        let mesh = build_gear(0.5, 2.0, 2.0, 10, 0.7).unwrap();
        for v in mesh.vertices() {
            assert!((v.position.z.abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_face_normals_are_unit() {
        let mesh = gear1();
        for v in mesh.vertices() {
            if v.normal.x == 0.0 && v.normal.y == 0.0 {
                assert!((v.normal.norm() - 1.0).abs() < 1e-5);
                // Front/back face normals agree with the face the vertex sits on
                assert_eq!(v.normal.z.signum(), v.position.z.signum());
            }
        }
    }

    #[test]
    fn test_side_normals_point_outward() {
        let mesh = build_gear(1.0, 4.0, 1.0, 20, 0.7).unwrap();
        let inner = mesh.spec().inner_radius;

        for v in mesh.vertices() {
            if v.normal.z != 0.0 {
                continue;
            }
            let radial = Vector3::new(v.position.x, v.position.y, 0.0);
            let on_hole = (radial.norm() - inner).abs() < 1e-4;
            let facing = v.normal.dot(&radial);
            if on_hole {
                // The hole wall faces the axis
                assert!(facing < 0.0, "inner normal {:?} at {:?}", v.normal, v.position);
            } else {
                assert!(facing > 0.0, "outer normal {:?} at {:?}", v.normal, v.position);
            }
        }
    }

    #[test]
    fn test_restart_vertices_duplicate_neighbours() {
        let mesh = build_gear(1.0, 4.0, 1.0, 3, 0.7).unwrap();
        let v = mesh.vertices();

        // Second strip (back face) starts right after the 7 front vertices
        assert_eq!(v[7], v[6]);
        assert_eq!(v[8], v[9]);
        assert_eq!(v[9].normal, Vector3::new(0.0, 0.0, -1.0));

        // The second tooth also opens with a restart pair
        let second_tooth = VERTICES_PER_TOOTH;
        assert_eq!(v[second_tooth], v[second_tooth - 1]);
        assert_eq!(v[second_tooth + 1], v[second_tooth + 2]);
    }

    #[test]
    fn test_strip_writer_first_strip_has_no_restart() {
        let mut writer = StripWriter::new(2.0, 8);
        writer.start_strip();
        writer.set_normal(0.0, 0.0, 1.0);
        writer.emit_vertex(Point2::new(1.0, 0.0), 1.0);
        writer.emit_vertex(Point2::new(0.0, 1.0), 1.0);
        writer.end_strip();
        assert_eq!(writer.len(), 2);

        writer.start_strip();
        writer.emit_quad(Point2::new(1.0, 0.0), Point2::new(0.0, 1.0));
        writer.end_strip();

        let vertices = writer.finish();
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[2], vertices[1]);
        assert_eq!(vertices[3], vertices[4]);
        assert_eq!(vertices[4].position.z, -1.0);
        assert_eq!(vertices[5].position.z, 1.0);
    }

    #[test]
    fn test_vertex_buffer_layout() {
        let mesh = gear1();
        let buffer = mesh.vertex_buffer();
        assert_eq!(buffer.len(), mesh.vertex_count() * GEAR_VERTEX_STRIDE);
        assert_eq!(&buffer[..6], &mesh.vertices()[0].to_array());
    }

    #[test]
    fn test_triangles_skip_restarts() {
        let mesh = build_gear(1.0, 4.0, 1.0, 3, 0.7).unwrap();
        let triangles: Vec<_> = mesh.triangles().collect();

        // 5 + 5 triangles per face strip, 2 per quad, 2 for the inner wall
        assert_eq!(triangles.len(), 3 * (5 + 5 + 4 * 2 + 2));
        assert!(triangles.iter().all(|t| !t.is_degenerate()));
    }
}
