//! Orthographic, z-buffered triangle rasterizer.

use glam::{Vec2, Vec3};

use crate::target::RenderTarget;
use crate::types::{CameraRig, Lighting, Transform};

use super::mesh::Mesh;

const NEAR_PLANE: f32 = 0.3;
const FAR_PLANE: f32 = 1000.0;
const AMBIENT: f32 = 0.35;
const ALBEDO: f32 = 0.8;

/// Per-pass state shared by every mesh drawn into one target.
pub(crate) struct RasterPass<'a> {
    target: &'a mut RenderTarget,
    depth: Vec<f32>,
    rig: CameraRig,
    lighting: Lighting,
}

impl<'a> RasterPass<'a> {
    /// Clear the target and start a pass through `rig`.
    pub(crate) fn begin(target: &'a mut RenderTarget, rig: CameraRig, lighting: Lighting) -> Self {
        target.clear(rig.clear.rgba());
        let depth = vec![f32::INFINITY; target.width() as usize * target.height() as usize];
        Self {
            target,
            depth,
            rig,
            lighting,
        }
    }

    pub(crate) fn draw(&mut self, mesh: &Mesh, transform: &Transform) {
        if self.rig.half_extent <= 0.0 {
            return;
        }
        let forward = self.rig.world_rotation() * Vec3::Z;
        let to_light = -self.lighting.direction();
        let tint = self.lighting.tint();

        for tri in &mesh.triangles {
            let world = tri.map(|i| transform.apply(mesh.positions[i]));
            let normal = (world[1] - world[0]).cross(world[2] - world[0]);
            if normal.length_squared() <= f32::EPSILON {
                continue;
            }
            let mut normal = normal.normalize();
            if normal.dot(forward) > 0.0 {
                normal = -normal;
            }
            let diffuse = normal.dot(to_light).max(0.0);
            let shade = (AMBIENT + (1.0 - AMBIENT) * diffuse) * ALBEDO;
            let color = (tint * shade).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            let rgba = [color.x as u8, color.y as u8, color.z as u8, 255];

            let view = world.map(|p| self.rig.to_view(p));
            if view.iter().any(|v| v.z < NEAR_PLANE || v.z > FAR_PLANE) {
                continue;
            }
            let screen = view.map(|v| self.project(v));
            self.fill(screen, [view[0].z, view[1].z, view[2].z], rgba);
        }
    }

    fn project(&self, view: Vec3) -> Vec2 {
        let width = self.target.width() as f32;
        let height = self.target.height() as f32;
        let half_h = self.rig.half_extent;
        let half_w = half_h * width / height;
        let ndc = Vec2::new(view.x / half_w, view.y / half_h);
        Vec2::new((ndc.x * 0.5 + 0.5) * width, (0.5 - ndc.y * 0.5) * height)
    }

    fn fill(&mut self, p: [Vec2; 3], z: [f32; 3], rgba: [u8; 4]) {
        let area = edge(p[0], p[1], p[2]);
        if area.abs() <= f32::EPSILON {
            return;
        }
        let width = self.target.width();
        let height = self.target.height();

        let min = p[0].min(p[1]).min(p[2]).floor().max(Vec2::ZERO);
        let max = p[0]
            .max(p[1])
            .max(p[2])
            .ceil()
            .min(Vec2::new(width as f32, height as f32));

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(p[1], p[2], sample) / area;
                let w1 = edge(p[2], p[0], sample) / area;
                let w2 = edge(p[0], p[1], sample) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * z[0] + w1 * z[1] + w2 * z[2];
                let slot = y as usize * width as usize + x as usize;
                if depth < self.depth[slot] {
                    self.depth[slot] = depth;
                    self.target.put_pixel(x, y, rgba);
                }
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
