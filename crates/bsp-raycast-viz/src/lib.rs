//! Shared visualization utilities for the ray-picking demos.

use std::f32::consts::FRAC_PI_4;
use std::hash::{Hash, Hasher};

use bsp_raycast::{
    Aabb, MeshRef, Ray, RayHit, RayIdGenerator, Real, Result, TreeStats, Triangle, TriangleFlags,
};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Vector3};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Vertical field of view used by [`OrbitCamera`], also needed for picking.
pub const FOVY: f32 = FRAC_PI_4;

/// Most vertices macroquad can index in one mesh with `u16` indices,
/// rounded down to whole triangles.
const MAX_BATCH_VERTICES: usize = (u16::MAX as usize / 3) * 3;

/// Converts a library point into a macroquad vector.
pub fn to_vec3(p: &Point3<Real>) -> Vec3 {
    vec3(p.x as f32, p.y as f32, p.z as f32)
}

/// Converts a library direction into a macroquad vector.
pub fn dir_to_vec3(v: &Vector3<Real>) -> Vec3 {
    vec3(v.x as f32, v.y as f32, v.z as f32)
}

/// Owned mesh arrays for a demo scene.
///
/// The tree borrows these through [`SceneMesh::mesh_ref`], so the scene must
/// outlive it.
#[derive(Debug, Default, Clone)]
pub struct SceneMesh {
    pub vertices: Vec<Point3<Real>>,
    pub normals: Vec<Vector3<Real>>,
    pub triangles: Vec<Triangle>,
}

impl SceneMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the arrays as a validated mesh view.
    pub fn mesh_ref(&self) -> Result<MeshRef<'_>> {
        MeshRef::new(&self.vertices, &self.normals, &self.triangles)
    }

    /// Adds a triangle with its own vertices and flat vertex normals.
    pub fn push_triangle(&mut self, corners: [Point3<Real>; 3], flags: TriangleFlags) {
        let base = self.vertices.len() as u32;
        let normal = (corners[1] - corners[0])
            .cross(&(corners[2] - corners[0]))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::y);
        self.vertices.extend(corners);
        self.normals.extend([normal; 3]);
        self.triangles
            .push(Triangle::new([base, base + 1, base + 2], flags));
    }

    /// Adds a planar quad as two triangles, counter-clockwise from outside.
    pub fn push_quad(&mut self, corners: [Point3<Real>; 4], flags: TriangleFlags) {
        let [a, b, c, d] = corners;
        self.push_triangle([a, b, c], flags);
        self.push_triangle([a, c, d], flags);
    }

    /// Adds the 12 triangles of a cube.
    pub fn push_cube(
        &mut self,
        center: Point3<Real>,
        size: Real,
        rotation: &Rotation3<Real>,
        flags: TriangleFlags,
    ) {
        let half = size / 2.0;
        let corners: Vec<Point3<Real>> = [
            Vector3::new(-half, -half, -half), // 0: left-bottom-back
            Vector3::new(half, -half, -half),  // 1: right-bottom-back
            Vector3::new(half, half, -half),   // 2: right-top-back
            Vector3::new(-half, half, -half),  // 3: left-top-back
            Vector3::new(-half, -half, half),  // 4: left-bottom-front
            Vector3::new(half, -half, half),   // 5: right-bottom-front
            Vector3::new(half, half, half),    // 6: right-top-front
            Vector3::new(-half, half, half),   // 7: left-top-front
        ]
        .iter()
        .map(|v| center + rotation * v)
        .collect();

        let faces: [[usize; 4]; 6] = [
            [4, 5, 6, 7], // front (+Z)
            [1, 0, 3, 2], // back (-Z)
            [0, 4, 7, 3], // left (-X)
            [5, 1, 2, 6], // right (+X)
            [7, 6, 2, 3], // top (+Y)
            [0, 1, 5, 4], // bottom (-Y)
        ];
        for face in faces {
            self.push_quad(face.map(|i| corners[i]), flags);
        }
    }

    /// Adds a `cells` × `cells` heightfield centered on the origin in the XZ plane.
    ///
    /// Vertices are shared between cells and get smoothed normals.
    pub fn push_terrain<F>(&mut self, size: Real, cells: u32, height: F, flags: TriangleFlags)
    where
        F: Fn(Real, Real) -> Real,
    {
        let base = self.vertices.len() as u32;
        let step = size / cells as Real;
        let origin = -size / 2.0;

        for j in 0..=cells {
            for i in 0..=cells {
                let x = origin + i as Real * step;
                let z = origin + j as Real * step;
                self.vertices.push(Point3::new(x, height(x, z), z));

                // Central differences
                let dx = height(x + step, z) - height(x - step, z);
                let dz = height(x, z + step) - height(x, z - step);
                self.normals
                    .push(Vector3::new(-dx, 2.0 * step, -dz).normalize());
            }
        }

        let index = |i: u32, j: u32| base + j * (cells + 1) + i;
        for j in 0..cells {
            for i in 0..cells {
                let (a, b) = (index(i, j), index(i + 1, j));
                let (c, d) = (index(i + 1, j + 1), index(i, j + 1));
                self.triangles.push(Triangle::new([a, d, c], flags));
                self.triangles.push(Triangle::new([a, c, b], flags));
            }
        }
    }
}

/// Generates a deterministic color for a triangle index.
pub fn triangle_color(index: usize) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    index.hash(&mut hasher);
    let hash = hasher.finish();

    // Keep colors away from black
    let r = (((hash >> 16) & 0xFF) as u8).max(40);
    let g = (((hash >> 8) & 0xFF) as u8).max(40);
    let b = ((hash & 0xFF) as u8).max(40);

    Color::from_rgba(r, g, b, 255)
}

/// Draws the listed triangles of `mesh`, in batches that fit `u16` indices.
///
/// `color` picks the color of each triangle from its index.
pub fn draw_triangles<I, F>(mesh: &MeshRef<'_>, indices: I, color: F)
where
    I: IntoIterator<Item = usize>,
    F: Fn(usize) -> Color,
{
    let mut vertices: Vec<Vertex> = Vec::new();

    for index in indices {
        let Some(triangle) = mesh.triangles().get(index) else {
            continue;
        };
        let c = color(index);
        for corner in mesh.corners(triangle) {
            vertices.push(Vertex::new2(to_vec3(&corner), vec2(0.0, 0.0), c));
        }
        if vertices.len() >= MAX_BATCH_VERTICES {
            flush_batch(&mut vertices);
        }
    }
    flush_batch(&mut vertices);
}

fn flush_batch(vertices: &mut Vec<Vertex>) {
    if vertices.is_empty() {
        return;
    }
    let mesh = Mesh {
        indices: (0..vertices.len() as u16).collect(),
        vertices: std::mem::take(vertices),
        texture: None,
    };
    draw_mesh(&mesh);
}

/// Draws every triangle of `mesh` in its index color.
pub fn draw_scene(mesh: &MeshRef<'_>) {
    draw_triangles(mesh, 0..mesh.triangles().len(), triangle_color);
}

/// Draws a box outline.
pub fn draw_aabb(bounds: &Aabb, color: Color) {
    let min = to_vec3(&bounds.min);
    let max = to_vec3(&bounds.max);
    draw_cube_wires((min + max) * 0.5, max - min, color);
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Sets the camera target point.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Converts to macroquad's Camera3D for rendering.
    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            fovy: FOVY,
            ..Default::default()
        }
    }

    /// Returns the eye point as a nalgebra point.
    pub fn eye_point(&self) -> Point3<Real> {
        let pos = self.position();
        Point3::new(pos.x as Real, pos.y as Real, pos.z as Real)
    }

    /// Builds the ray through screen position `mouse` (in pixels).
    pub fn pick_ray(&self, mouse: Vec2, ids: &RayIdGenerator) -> Ray {
        let ndc_x = mouse.x / screen_width() * 2.0 - 1.0;
        let ndc_y = 1.0 - mouse.y / screen_height() * 2.0;
        let aspect = screen_width() / screen_height();
        let half_height = (FOVY / 2.0).tan();

        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(vec3(0.0, 1.0, 0.0)).normalize();
        let up = right.cross(forward);
        let dir = forward + right * (ndc_x * half_height * aspect) + up * (ndc_y * half_height);

        ids.ray(
            self.eye_point(),
            Vector3::new(dir.x as Real, dir.y as Real, dir.z as Real),
        )
    }
}

/// Marks a hit point and draws its normal.
pub fn draw_hit(ray: &Ray, hit: &RayHit) {
    let point = to_vec3(&hit.point(ray));
    draw_sphere(point, 0.03, None, RED);
    draw_line_3d(point, point + dir_to_vec3(&hit.normal) * 0.3, ORANGE);
}

/// Draws one text line per interesting statistic, starting at `y`.
/// Returns the y coordinate below the last line.
pub fn draw_stats(stats: &TreeStats, y: f32) -> f32 {
    let lines = [
        format!("{} nodes, {} leaves, depth {}", stats.nodes, stats.leaves, stats.max_depth),
        format!(
            "{:.2} triangles/leaf (max {}), {} duplicated",
            stats.avg_triangles_per_leaf, stats.max_triangles_per_leaf, stats.duplicated_triangles
        ),
    ];
    let mut y = y;
    for line in &lines {
        draw_text(line, 10.0, y, 18.0, GRAY);
        y += 20.0;
    }
    y
}

/// Unwraps a tree query, printing the error instead of dropping it.
pub fn report_pick(result: Result<Option<RayHit>>) -> Option<RayHit> {
    match result {
        Ok(hit) => hit,
        Err(err) => {
            println!("Pick failed: {err}");
            None
        }
    }
}

/// Draws the result of the last pick, if any.
pub fn draw_pick_ui(hit: Option<&RayHit>, y: f32) {
    let text = match hit {
        Some(hit) => format!(
            "Hit triangle {} at {:.3} (u {:.2}, v {:.2})",
            hit.triangle, hit.distance, hit.u, hit.v
        ),
        None => "Right click to pick".to_string(),
    };
    draw_text(&text, 10.0, y, 18.0, SKYBLUE);
}
