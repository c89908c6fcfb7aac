//! Triangle meshes loaded from Wavefront OBJ files.

use std::io::BufRead;
use std::path::Path;

use glam::Vec3;
use propshot_common::error::{PropshotError, PropshotResult};

use crate::types::{Bounds, Transform};

/// Indexed triangle mesh in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[usize; 3]>,
}

impl Mesh {
    /// Load an OBJ file. Polygons are fan-triangulated.
    pub fn load(path: &Path) -> PropshotResult<Self> {
        let parsed = obj::Obj::load(path).map_err(|e| {
            PropshotError::asset(format!("Failed to load {}: {e}", path.display()))
        })?;
        Self::from_obj_data(&parsed.data)
            .map_err(|e| PropshotError::asset(format!("{}: {e}", path.display())))
    }

    /// Parse OBJ text from a reader.
    pub fn from_reader(reader: impl BufRead) -> PropshotResult<Self> {
        let data = obj::ObjData::load_buf(reader)
            .map_err(|e| PropshotError::asset(format!("Failed to parse OBJ data: {e}")))?;
        Self::from_obj_data(&data)
    }

    fn from_obj_data(data: &obj::ObjData) -> PropshotResult<Self> {
        let positions: Vec<Vec3> = data.position.iter().copied().map(Vec3::from).collect();

        let mut triangles = Vec::new();
        for object in &data.objects {
            for group in &object.groups {
                for poly in &group.polys {
                    let corners: Vec<usize> = poly.0.iter().map(|tuple| tuple.0).collect();
                    if let Some(&bad) = corners.iter().find(|&&i| i >= positions.len()) {
                        return Err(PropshotError::asset(format!(
                            "face references vertex {bad} but only {} exist",
                            positions.len()
                        )));
                    }
                    for i in 1..corners.len().saturating_sub(1) {
                        triangles.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
            }
        }

        Ok(Self {
            positions,
            triangles,
        })
    }

    /// Axis-aligned cube centred on the origin.
    pub fn cube(half: f32) -> Self {
        let h = half;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let quads = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [1, 2, 6, 5],
            [0, 4, 7, 3],
        ];
        let triangles = quads
            .iter()
            .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
            .collect();
        Self {
            positions,
            triangles,
        }
    }

    /// Bounds of the mesh placed at `transform`. `None` for an empty mesh.
    pub fn bounds(&self, transform: &Transform) -> Option<Bounds> {
        let mut points = self.positions.iter().map(|&p| transform.apply(p));
        let mut bounds = Bounds::at(points.next()?);
        for point in points {
            bounds.encapsulate(point);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 2 0
v 0 2 0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = Mesh::from_reader(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_bounds_follow_transform() {
        let mesh = Mesh::from_reader(QUAD.as_bytes()).unwrap();
        let bounds = mesh
            .bounds(&Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn test_cube_has_twelve_triangles() {
        let cube = Mesh::cube(0.5);
        assert_eq!(cube.triangles.len(), 12);
        let bounds = cube.bounds(&Transform::IDENTITY).unwrap();
        assert_eq!(bounds.size(), Vec3::ONE);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::default().bounds(&Transform::IDENTITY).is_none());
    }
}
