//! Reusable offscreen render target.

use propshot_common::error::PropshotResult;
use propshot_scene::{CameraId, RenderTarget, SceneHost};

/// Owns one render target and re-renders into it on demand.
///
/// The target is reallocated only when the requested size differs from the
/// size it was last allocated with.
#[derive(Debug, Default)]
pub struct OffscreenRenderer {
    target: Option<RenderTarget>,
    allocations: u64,
}

impl OffscreenRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the target matches `width` x `height` (each clamped to at
    /// least one). Returns `true` when a new target was allocated.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> bool {
        let wanted = (width.max(1), height.max(1));
        if self.target.as_ref().map(RenderTarget::size) == Some(wanted) {
            return false;
        }
        tracing::debug!(
            width = wanted.0,
            height = wanted.1,
            "Allocating render target"
        );
        self.target = Some(RenderTarget::new(wanted.0, wanted.1));
        self.allocations += 1;
        true
    }

    /// Render one pass through `camera` into a target of the requested size.
    ///
    /// Without a camera nothing is rendered and `Ok(false)` is returned.
    pub fn render_now<H>(
        &mut self,
        host: &mut H,
        camera: Option<CameraId>,
        width: u32,
        height: u32,
    ) -> PropshotResult<bool>
    where
        H: SceneHost + ?Sized,
    {
        self.ensure_size(width, height);
        let (Some(camera), Some(target)) = (camera, self.target.as_mut()) else {
            return Ok(false);
        };
        host.render(camera, target)?;
        Ok(true)
    }

    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// Size of the current target, if one is allocated.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.target.as_ref().map(RenderTarget::size)
    }

    /// Number of targets allocated over this renderer's lifetime.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Drop the target.
    pub fn release(&mut self) {
        if self.target.take().is_some() {
            tracing::debug!("Released render target");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use propshot_scene::software::SoftwareHost;
    use propshot_scene::CameraRig;

    #[test]
    fn test_render_without_camera_is_noop() {
        let mut host = SoftwareHost::new(".");
        let mut renderer = OffscreenRenderer::new();
        let rendered = renderer.render_now(&mut host, None, 8, 8).unwrap();
        assert!(!rendered);
        assert_eq!(renderer.size(), Some((8, 8)));
    }

    #[test]
    fn test_render_overwrites_with_clear_color() {
        let mut host = SoftwareHost::new(".");
        let camera = host.create_camera(CameraRig {
            clear: propshot_scene::ClearColor::White,
            ..CameraRig::default()
        });
        let mut renderer = OffscreenRenderer::new();
        assert!(renderer.render_now(&mut host, Some(camera), 4, 2).unwrap());
        let target = renderer.target().unwrap();
        assert!(target.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_release_then_reallocate() {
        let mut renderer = OffscreenRenderer::new();
        assert!(renderer.ensure_size(0, 0));
        assert_eq!(renderer.size(), Some((1, 1)));
        renderer.release();
        assert_eq!(renderer.size(), None);
        assert!(renderer.ensure_size(1, 1));
        assert_eq!(renderer.allocations(), 2);
    }

    proptest! {
        #[test]
        fn test_reallocates_iff_size_changes(sizes in prop::collection::vec((1u32..6, 1u32..6), 1..32)) {
            let mut renderer = OffscreenRenderer::new();
            let mut previous = None;
            let mut expected = 0u64;
            for (w, h) in sizes {
                let reallocated = renderer.ensure_size(w, h);
                prop_assert_eq!(reallocated, previous != Some((w, h)));
                if reallocated {
                    expected += 1;
                }
                previous = Some((w, h));
                prop_assert_eq!(renderer.size(), Some((w, h)));
            }
            prop_assert_eq!(renderer.allocations(), expected);
        }
    }
}
