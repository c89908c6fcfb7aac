//! Single-object staging.

use propshot_common::error::PropshotResult;
use propshot_project_model::settings::AssetRef;
use propshot_scene::{ObjectId, SceneHost, Transform};

/// A live instance placed by an [`ObjectStage`].
#[derive(Debug, Clone, PartialEq)]
pub struct StagedObject {
    pub id: ObjectId,
    pub asset: AssetRef,
    pub transform: Transform,
}

/// Holds at most one live instance of a source asset.
///
/// The new instance is created before the previous one is destroyed, so a
/// failed load leaves the previous instance staged. The stage owns the
/// instance handle and must be cleared before it is dropped.
#[derive(Debug, Default)]
pub struct ObjectStage {
    object: Option<StagedObject>,
}

impl ObjectStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the staged instance with a new instance of `asset`.
    ///
    /// Rigid bodies on the instance stop simulating and colliding. On error
    /// the stage is unchanged.
    pub fn stage<H>(
        &mut self,
        host: &mut H,
        asset: &AssetRef,
        transform: Transform,
    ) -> PropshotResult<ObjectId>
    where
        H: SceneHost + ?Sized,
    {
        let id = host.instantiate(asset, transform)?;
        self.clear(host);
        if host.physics(id).is_some() {
            host.freeze_physics(id);
        }
        tracing::debug!(asset = %asset, id = id.raw(), "Staged object");
        self.object = Some(StagedObject {
            id,
            asset: asset.clone(),
            transform,
        });
        Ok(id)
    }

    /// Destroy the staged instance. Does nothing when the stage is empty.
    pub fn clear<H>(&mut self, host: &mut H)
    where
        H: SceneHost + ?Sized,
    {
        if let Some(object) = self.object.take() {
            host.destroy(object.id);
        }
    }

    pub fn object(&self) -> Option<&StagedObject> {
        self.object.as_ref()
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.object.as_ref().map(|o| o.id)
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_none()
    }
}
