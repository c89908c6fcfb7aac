//! Reference scene host.
//!
//! [`SoftwareHost`] resolves assets as OBJ files under an asset root and
//! renders them with a CPU rasterizer. Play mode drives a fixed-rate capture
//! clock and spins active objects on a turntable so frame sequences show
//! motion.

pub mod mesh;
mod raster;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Quat;
use propshot_common::clock::CaptureClock;
use propshot_common::error::{PropshotError, PropshotResult};
use propshot_project_model::settings::AssetRef;

use crate::host::SceneHost;
use crate::target::RenderTarget;
use crate::types::{
    Bounds, CameraId, CameraRig, Lighting, ObjectId, PhysicsBody, Transform,
};

pub use mesh::Mesh;

/// Default capture rate before a panel sets one.
const DEFAULT_CAPTURE_FPS: u32 = 30;

#[derive(Debug)]
struct SceneObject {
    asset: AssetRef,
    mesh: Mesh,
    transform: Transform,
    /// Rotation when play mode started; restored when it ends.
    rest_rotation: Quat,
    active: bool,
    physics: Option<PhysicsBody>,
}

/// CPU scene host backed by OBJ files.
#[derive(Debug)]
pub struct SoftwareHost {
    asset_root: PathBuf,
    objects: BTreeMap<ObjectId, SceneObject>,
    cameras: BTreeMap<CameraId, CameraRig>,
    main_camera: Option<CameraId>,
    lighting: Lighting,
    playing: bool,
    capture_fps: u32,
    clock: CaptureClock,
    turntable_speed: f32,
    rigid_bodies: bool,
    next_id: u64,
}

impl SoftwareHost {
    /// Host resolving relative asset paths against `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            objects: BTreeMap::new(),
            cameras: BTreeMap::new(),
            main_camera: None,
            lighting: Lighting::default(),
            playing: false,
            capture_fps: DEFAULT_CAPTURE_FPS,
            clock: CaptureClock::start(DEFAULT_CAPTURE_FPS),
            turntable_speed: 0.0,
            rigid_bodies: true,
            next_id: 1,
        }
    }

    /// Turntable speed in degrees per simulated second while playing.
    pub fn with_turntable(mut self, degrees_per_sec: f32) -> Self {
        self.turntable_speed = degrees_per_sec;
        self
    }

    /// Whether instantiated objects carry a rigid body.
    pub fn with_rigid_bodies(mut self, enabled: bool) -> Self {
        self.rigid_bodies = enabled;
        self
    }

    pub fn set_turntable(&mut self, degrees_per_sec: f32) {
        self.turntable_speed = degrees_per_sec;
    }

    /// Designate the main camera. The camera must have been created by this host.
    pub fn set_main_camera(&mut self, camera: Option<CameraId>) {
        self.main_camera = camera.filter(|id| self.cameras.contains_key(id));
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    /// Simulated seconds elapsed in the current play session.
    pub fn simulated_secs(&self) -> f64 {
        self.clock.simulated_secs()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn transform(&self, id: ObjectId) -> Option<Transform> {
        self.objects.get(&id).map(|o| o.transform)
    }

    pub fn asset_of(&self, id: ObjectId) -> Option<&AssetRef> {
        self.objects.get(&id).map(|o| &o.asset)
    }

    fn asset_path(&self, asset: &AssetRef) -> PathBuf {
        self.asset_root.join(asset.path())
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn apply_turntable(&mut self) {
        let angle = (self.turntable_speed as f64 * self.clock.simulated_secs()) as f32;
        let spin = Quat::from_rotation_y(angle.to_radians());
        for object in self.objects.values_mut().filter(|o| o.active) {
            object.transform.rotation = spin * object.rest_rotation;
        }
    }
}

impl SceneHost for SoftwareHost {
    fn resolves(&self, asset: &AssetRef) -> bool {
        self.asset_path(asset).is_file()
    }

    fn instantiate(&mut self, asset: &AssetRef, transform: Transform) -> PropshotResult<ObjectId> {
        let path = self.asset_path(asset);
        if !path.is_file() {
            return Err(PropshotError::FileNotFound { path });
        }
        let mesh = Mesh::load(&path)?;
        let id = ObjectId(self.next_id());
        tracing::debug!(
            id = id.raw(),
            asset = %asset,
            triangles = mesh.triangles.len(),
            "Instantiated object"
        );
        self.objects.insert(
            id,
            SceneObject {
                asset: asset.clone(),
                mesh,
                transform,
                rest_rotation: transform.rotation,
                active: true,
                physics: self.rigid_bodies.then(PhysicsBody::default),
            },
        );
        Ok(id)
    }

    fn destroy(&mut self, id: ObjectId) {
        if self.objects.remove(&id).is_some() {
            tracing::debug!(id = id.raw(), "Destroyed object");
        }
    }

    fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn set_active(&mut self, id: ObjectId, active: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.active = active;
        }
    }

    fn is_active(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.active)
    }

    fn physics(&self, id: ObjectId) -> Option<PhysicsBody> {
        self.objects.get(&id).and_then(|o| o.physics)
    }

    fn freeze_physics(&mut self, id: ObjectId) {
        if let Some(body) = self.objects.get_mut(&id).and_then(|o| o.physics.as_mut()) {
            body.simulated = false;
            body.detect_collisions = false;
        }
    }

    fn world_bounds(&self, id: ObjectId) -> Option<Bounds> {
        let object = self.objects.get(&id)?;
        object
            .mesh
            .bounds(&object.transform)
            .or_else(|| Some(Bounds::at(object.transform.position)))
    }

    fn create_camera(&mut self, rig: CameraRig) -> CameraId {
        let id = CameraId(self.next_id());
        self.cameras.insert(id, rig);
        id
    }

    fn camera(&self, id: CameraId) -> Option<CameraRig> {
        self.cameras.get(&id).copied()
    }

    fn update_camera(&mut self, id: CameraId, rig: CameraRig) {
        if let Some(slot) = self.cameras.get_mut(&id) {
            *slot = rig;
        }
    }

    fn destroy_camera(&mut self, id: CameraId) {
        self.cameras.remove(&id);
        if self.main_camera == Some(id) {
            self.main_camera = None;
        }
    }

    fn main_camera(&self) -> Option<CameraId> {
        self.main_camera
    }

    fn render(&mut self, camera: CameraId, target: &mut RenderTarget) -> PropshotResult<()> {
        let rig = self
            .cameras
            .get(&camera)
            .copied()
            .ok_or_else(|| PropshotError::scene(format!("unknown camera {}", camera.raw())))?;

        let mut pass = raster::RasterPass::begin(target, rig, self.lighting);
        for object in self.objects.values().filter(|o| o.active) {
            pass.draw(&object.mesh, &object.transform);
        }
        Ok(())
    }

    fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        self.playing = playing;
        if playing {
            self.clock = CaptureClock::start(self.capture_fps);
            for object in self.objects.values_mut() {
                object.rest_rotation = object.transform.rotation;
            }
            tracing::info!(fps = self.capture_fps, "Entered play mode");
        } else {
            for object in self.objects.values_mut() {
                object.transform.rotation = object.rest_rotation;
            }
            tracing::info!(
                frames = self.clock.frames(),
                simulated_secs = self.clock.simulated_secs(),
                wall_secs = self.clock.wall_elapsed_secs(),
                "Left play mode"
            );
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_capture_frame_rate(&mut self, fps: u32) {
        self.capture_fps = fps.max(1);
        self.clock.set_fps(self.capture_fps);
    }

    fn advance_frame(&mut self) {
        if !self.playing {
            return;
        }
        self.clock.advance();
        self.apply_turntable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn host_with_cube(name: &str) -> (SoftwareHost, AssetRef, PathBuf) {
        let dir = std::env::temp_dir().join(format!("propshot_test_host_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("cube.obj"),
            "v -0.5 0 -0.5\nv 0.5 0 -0.5\nv 0.5 1 -0.5\nv -0.5 1 -0.5\n\
             v -0.5 0 0.5\nv 0.5 0 0.5\nv 0.5 1 0.5\nv -0.5 1 0.5\n\
             f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 3 4 8 7\nf 2 3 7 6\nf 1 5 8 4\n",
        )
        .unwrap();
        (SoftwareHost::new(&dir), AssetRef::new("cube.obj"), dir)
    }

    fn framing_rig() -> CameraRig {
        CameraRig {
            local_position: Vec3::new(0.0, 0.5, -10.0),
            half_extent: 1.0,
            ..CameraRig::default()
        }
    }

    #[test]
    fn test_instantiate_and_destroy() {
        let (mut host, asset, dir) = host_with_cube("lifecycle");
        assert!(host.resolves(&asset));
        let id = host.instantiate(&asset, Transform::IDENTITY).unwrap();
        assert!(host.contains(id));
        assert!(host.is_active(id));

        let bounds = host.world_bounds(id).unwrap();
        assert!((bounds.center().y - 0.5).abs() < 1e-6);

        host.destroy(id);
        host.destroy(id);
        assert!(!host.contains(id));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_asset_is_file_not_found() {
        let mut host = SoftwareHost::new(std::env::temp_dir());
        let err = host
            .instantiate(&AssetRef::new("propshot_missing_asset.obj"), Transform::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, PropshotError::FileNotFound { .. }));
    }

    #[test]
    fn test_freeze_physics() {
        let (mut host, asset, dir) = host_with_cube("physics");
        let id = host.instantiate(&asset, Transform::IDENTITY).unwrap();
        assert_eq!(host.physics(id), Some(PhysicsBody::default()));
        host.freeze_physics(id);
        let body = host.physics(id).unwrap();
        assert!(!body.simulated && !body.detect_collisions);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_render_draws_only_active_objects() {
        let (mut host, asset, dir) = host_with_cube("render");
        let id = host.instantiate(&asset, Transform::IDENTITY).unwrap();
        let camera = host.create_camera(framing_rig());
        let mut target = RenderTarget::new(32, 32);

        host.render(camera, &mut target).unwrap();
        assert_eq!(target.pixel(16, 16).unwrap()[3], 255);
        assert_eq!(target.pixel(0, 0).unwrap()[3], 0);

        host.set_active(id, false);
        host.render(camera, &mut target).unwrap();
        assert!(target.pixels().iter().all(|&b| b == 0));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_render_unknown_camera_errors() {
        let mut host = SoftwareHost::new(".");
        let camera = host.create_camera(CameraRig::default());
        host.destroy_camera(camera);
        let mut target = RenderTarget::new(4, 4);
        assert!(host.render(camera, &mut target).is_err());
    }

    #[test]
    fn test_play_mode_spins_and_restores() {
        let (host, asset, dir) = host_with_cube("play");
        let mut host = host.with_turntable(90.0);
        let id = host.instantiate(&asset, Transform::IDENTITY).unwrap();
        host.set_capture_frame_rate(10);

        host.advance_frame();
        assert_eq!(host.simulated_secs(), 0.0);

        host.set_playing(true);
        for _ in 0..10 {
            host.advance_frame();
        }
        assert!((host.simulated_secs() - 1.0).abs() < 1e-9);
        let spun = host.transform(id).unwrap().rotation;
        assert!(spun.angle_between(Quat::IDENTITY) > 1.0);

        host.set_playing(false);
        assert_eq!(host.transform(id).unwrap().rotation, Quat::IDENTITY);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_main_camera_must_exist() {
        let mut host = SoftwareHost::new(".");
        let camera = host.create_camera(CameraRig::default());
        host.set_main_camera(Some(camera));
        assert_eq!(host.main_camera(), Some(camera));
        host.destroy_camera(camera);
        assert_eq!(host.main_camera(), None);
        host.set_main_camera(Some(camera));
        assert_eq!(host.main_camera(), None);
    }
}
