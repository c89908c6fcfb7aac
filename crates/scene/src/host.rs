//! The host engine seam.

use propshot_common::error::PropshotResult;
use propshot_project_model::settings::AssetRef;

use crate::target::RenderTarget;
use crate::types::{Bounds, CameraId, CameraRig, Lighting, ObjectId, PhysicsBody, Transform};

/// Engine operations the capture panels depend on.
///
/// Objects and cameras are explicit handles: whoever creates one owns it and
/// must hand it back through the matching destroy call. Destroying a handle
/// the host no longer knows about is a no-op.
pub trait SceneHost {
    /// Whether `asset` still resolves to a loadable source.
    fn resolves(&self, asset: &AssetRef) -> bool;

    /// Instantiate `asset` at `transform`. New objects are active.
    fn instantiate(&mut self, asset: &AssetRef, transform: Transform) -> PropshotResult<ObjectId>;

    fn destroy(&mut self, id: ObjectId);

    fn contains(&self, id: ObjectId) -> bool;

    /// Show or hide an object. Inactive objects are not rendered.
    fn set_active(&mut self, id: ObjectId, active: bool);

    fn is_active(&self, id: ObjectId) -> bool;

    /// The object's rigid body, if it carries one.
    fn physics(&self, id: ObjectId) -> Option<PhysicsBody>;

    /// Stop simulating the object's rigid body and disable its collisions.
    fn freeze_physics(&mut self, id: ObjectId);

    /// World-space bounds of everything the object renders.
    fn world_bounds(&self, id: ObjectId) -> Option<Bounds>;

    fn create_camera(&mut self, rig: CameraRig) -> CameraId;

    fn camera(&self, id: CameraId) -> Option<CameraRig>;

    /// Replace a camera's rig parameters.
    fn update_camera(&mut self, id: CameraId, rig: CameraRig);

    fn destroy_camera(&mut self, id: CameraId);

    /// The scene's designated main camera, if any.
    fn main_camera(&self) -> Option<CameraId>;

    /// Render every active object through `camera` into `target`,
    /// overwriting its full contents.
    fn render(&mut self, camera: CameraId, target: &mut RenderTarget) -> PropshotResult<()>;

    fn set_lighting(&mut self, lighting: Lighting);

    /// Enter or leave play mode.
    fn set_playing(&mut self, playing: bool);

    fn is_playing(&self) -> bool;

    /// Fixed capture rate for play mode, in frames per simulated second.
    fn set_capture_frame_rate(&mut self, fps: u32);

    /// Advance simulated time by one capture frame. Ignored outside play mode.
    fn advance_frame(&mut self);
}
