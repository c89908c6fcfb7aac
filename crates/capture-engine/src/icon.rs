//! Icon export panel.
//!
//! The panel keeps a registry of source assets. Every entry owns one staged
//! instance; exactly one instance is active at a time (the focused entry)
//! and the capture camera is framed from that entry's persisted settings.

use std::path::PathBuf;

use glam::Vec3;
use propshot_common::error::{PropshotError, PropshotResult};
use propshot_project_model::request::{ExportRequest, ImageFormat};
use propshot_project_model::settings::{AssetRef, LightingMode, PrefabSettings};
use propshot_project_model::store::SettingsStore;
use propshot_render_engine::{
    clear_color_for, FileWriter, FrameEncoder, OffscreenRenderer, WriteHandle, WritePolicy,
    WriteScope,
};
use propshot_scene::{
    Bounds, CameraId, CameraRig, ClearColor, Lighting, ObjectId, SceneHost, Transform,
};

use crate::stage::ObjectStage;

/// Distance of the capture camera behind the tilt pivot.
pub const CAMERA_DISTANCE: f32 = 10.0;

/// Camera placement derived from one asset's framing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    pub local_position: Vec3,
    pub half_extent: f32,
    pub rotate: f32,
    pub tilt: f32,
}

impl CameraFraming {
    pub fn from_settings(settings: &PrefabSettings) -> Self {
        let size = settings.camera_size;
        Self {
            local_position: Vec3::new(
                -settings.offset.x * size,
                settings.original_y + settings.offset.y * size,
                -CAMERA_DISTANCE,
            ),
            half_extent: size,
            rotate: settings.camera_rotate,
            tilt: settings.camera_tilt,
        }
    }

    pub fn rig(&self, clear: ClearColor) -> CameraRig {
        CameraRig {
            rotate: self.rotate,
            tilt: self.tilt,
            local_position: self.local_position,
            half_extent: self.half_extent,
            clear,
        }
    }
}

/// One registered asset.
#[derive(Debug)]
pub struct RegistryEntry {
    stage: ObjectStage,
    settings: PrefabSettings,
    advanced_open: bool,
}

impl RegistryEntry {
    pub fn asset(&self) -> &AssetRef {
        &self.settings.asset
    }

    /// Framing currently in effect for this entry.
    pub fn settings(&self) -> &PrefabSettings {
        &self.settings
    }

    pub fn stage(&self) -> &ObjectStage {
        &self.stage
    }

    pub fn advanced_open(&self) -> bool {
        self.advanced_open
    }
}

/// Interactive icon generator.
#[derive(Debug)]
pub struct IconPanel {
    store: SettingsStore,
    camera: Option<CameraId>,
    entries: Vec<RegistryEntry>,
    focus: Option<usize>,
    renderer: OffscreenRenderer,
    encoder: FrameEncoder,
    writer: FileWriter,
    scope: WriteScope,
    closed: bool,
}

impl IconPanel {
    /// Open the panel: create the camera rig, apply lighting, render once.
    pub fn open<H>(
        host: &mut H,
        store: SettingsStore,
        writer: FileWriter,
        encoder: FrameEncoder,
    ) -> PropshotResult<Self>
    where
        H: SceneHost + ?Sized,
    {
        let mut panel = Self {
            store,
            camera: None,
            entries: Vec::new(),
            focus: None,
            renderer: OffscreenRenderer::new(),
            encoder,
            writer,
            scope: WriteScope::new(),
            closed: false,
        };
        panel.ensure_camera(host);
        panel.apply_lighting(host);
        panel.render(host)?;

        tracing::info!(
            settings = %panel.store.path().display(),
            records = panel.store.settings().settings.len(),
            "Opened icon panel"
        );
        Ok(panel)
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Index of the focused entry.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn camera(&self) -> Option<CameraId> {
        self.camera
    }

    pub fn renderer(&self) -> &OffscreenRenderer {
        &self.renderer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Register `asset` and focus it.
    ///
    /// A persisted record for the asset is reused as-is; otherwise one is
    /// derived from the instance's bounds and persisted. Fails once the panel
    /// is closed.
    pub fn register<H>(&mut self, host: &mut H, asset: &AssetRef) -> PropshotResult<usize>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("register") {
            return Err(PropshotError::capture("icon panel is closed"));
        }
        let mut stage = ObjectStage::new();
        let id = stage.stage(host, asset, Transform::IDENTITY)?;
        let settings = self.settings_for(&*host, asset, id);

        self.entries.push(RegistryEntry {
            stage,
            settings,
            advanced_open: false,
        });
        let index = self.entries.len() - 1;
        tracing::info!(asset = %asset, index, "Registered asset");

        self.update_scene(host, index);
        self.render(host)?;
        Ok(index)
    }

    /// Point entry `index` at a different asset.
    ///
    /// When the new asset fails to load the entry keeps its previous
    /// instance and framing.
    pub fn replace<H>(&mut self, host: &mut H, index: usize, asset: &AssetRef) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("replace") {
            return Ok(());
        }
        let Some(entry) = self.entries.get_mut(index) else {
            tracing::debug!(index, "Replace ignored: no such entry");
            return Ok(());
        };
        let id = entry.stage.stage(host, asset, Transform::IDENTITY)?;
        let settings = self.settings_for(&*host, asset, id);
        self.entries[index].settings = settings;

        self.update_scene(host, index);
        self.render(host)
    }

    /// Remove entry `index`. Focus moves to the entry that takes its place,
    /// or to the previous one when it was last.
    pub fn remove<H>(&mut self, host: &mut H, index: usize) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("remove") {
            return Ok(());
        }
        if index >= self.entries.len() {
            tracing::debug!(index, "Remove ignored: no such entry");
            return Ok(());
        }
        let mut entry = self.entries.remove(index);
        entry.stage.clear(host);
        tracing::info!(asset = %entry.asset(), index, "Removed asset from registry");

        if self.entries.is_empty() {
            self.focus = None;
            self.renderer.release();
            return Ok(());
        }

        let next = index.min(self.entries.len() - 1);
        self.update_scene(host, next);
        self.render(host)
    }

    /// Open or close the advanced settings of entry `index` and focus it.
    pub fn toggle_advanced<H>(&mut self, host: &mut H, index: usize) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("toggle_advanced") {
            return Ok(());
        }
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(());
        };
        let open = !entry.advanced_open;
        self.update_scene(host, index);
        self.entries[index].advanced_open = open;
        self.render(host)
    }

    /// Edit the camera size, tilt and rotate of entry `index`.
    pub fn set_framing<H>(
        &mut self,
        host: &mut H,
        index: usize,
        camera_size: f32,
        camera_tilt: f32,
        camera_rotate: f32,
    ) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_framing") {
            return Ok(());
        }
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(());
        };
        entry.settings.set_camera_size(camera_size);
        entry.settings.camera_tilt = camera_tilt;
        entry.settings.camera_rotate = camera_rotate;
        self.persist_entry(index);

        self.update_scene(host, index);
        self.render(host)
    }

    /// Set the framing offset of the focused entry.
    pub fn set_offset<H>(&mut self, host: &mut H, x: f32, y: f32) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_offset") {
            return Ok(());
        }
        let Some(index) = self.focus else {
            return Ok(());
        };
        self.entries[index].settings.set_offset(x, y);
        self.persist_entry(index);

        self.update_scene(host, index);
        self.render(host)
    }

    /// Re-apply the focused entry's framing and render.
    pub fn refresh<H>(&mut self, host: &mut H) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("refresh") {
            return Ok(());
        }
        if let Some(index) = self.focus {
            self.update_scene(host, index);
        }
        self.render(host)
    }

    pub fn set_export_path(&mut self, path: impl Into<PathBuf>) {
        if self.ignore_closed("set_export_path") {
            return;
        }
        let path = path.into();
        tracing::debug!(path = %path.display(), "Icon export path changed");
        self.store.update(|s| s.export_path = path);
    }

    pub fn set_image_size<H>(&mut self, host: &mut H, width: u32, height: u32) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_image_size") {
            return Ok(());
        }
        self.store.update(|s| s.set_image_size(width, height));
        self.render(host)
    }

    pub fn set_light_rotation<H>(&mut self, host: &mut H, degrees: f32) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_light_rotation") {
            return Ok(());
        }
        self.store.update(|s| s.light_rotation = degrees);
        self.apply_lighting(host);
        self.render(host)
    }

    pub fn set_lighting_mode<H>(&mut self, host: &mut H, mode: LightingMode) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_lighting_mode") {
            return Ok(());
        }
        self.store.update(|s| s.lighting_mode = mode);
        self.apply_lighting(host);
        self.render(host)
    }

    /// Switch the output encoding. The camera clears to white for formats
    /// without transparency.
    pub fn set_image_format<H>(&mut self, host: &mut H, format: ImageFormat) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("set_image_format") {
            return Ok(());
        }
        self.store.update(|s| s.image_format = format);
        self.apply_camera(host);
        self.render(host)
    }

    /// Export the focused entry.
    ///
    /// With an empty registry nothing is written and `Ok(None)` is returned.
    pub fn export_current<H>(&mut self, host: &mut H) -> PropshotResult<Option<WriteHandle>>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("export_current") {
            return Ok(None);
        }
        if self.entries.is_empty() {
            tracing::info!("Nothing to export: register an asset first");
            return Ok(None);
        }
        let index = self.focus.unwrap_or(0);
        self.export_index(host, index).map(Some)
    }

    /// Export every registered entry in registry order.
    pub fn export_all<H>(&mut self, host: &mut H) -> PropshotResult<Vec<WriteHandle>>
    where
        H: SceneHost + ?Sized,
    {
        if self.ignore_closed("export_all") {
            return Ok(Vec::new());
        }
        if self.entries.is_empty() {
            tracing::info!("Nothing to export: register an asset first");
            return Ok(Vec::new());
        }
        (0..self.entries.len())
            .map(|index| self.export_index(host, index))
            .collect()
    }

    /// Tear the panel down: destroy the camera rig and staged objects, drop
    /// settings records whose assets no longer resolve, and commit settings.
    pub fn close<H>(&mut self, host: &mut H) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(camera) = self.camera.take() {
            host.destroy_camera(camera);
        }
        for entry in &mut self.entries {
            entry.stage.clear(host);
        }
        self.entries.clear();
        self.focus = None;
        self.renderer.release();

        let removed = self
            .store
            .update(|s| s.prune(|asset| host.resolves(asset)));
        for asset in &removed {
            tracing::info!(asset = %asset, "Dropped settings for missing asset");
        }

        self.store
            .commit()
            .map_err(|e| PropshotError::settings(e.to_string()))?;
        tracing::info!("Closed icon panel");
        Ok(())
    }

    /// Whether the panel is closed. Calls on a closed panel touch neither
    /// the scene nor the settings.
    fn ignore_closed(&self, op: &'static str) -> bool {
        if self.closed {
            tracing::debug!(op, "Ignoring call on closed icon panel");
        }
        self.closed
    }

    fn export_index<H>(&mut self, host: &mut H, index: usize) -> PropshotResult<WriteHandle>
    where
        H: SceneHost + ?Sized,
    {
        self.update_scene(host, index);
        self.render(host)?;

        let settings = self.store.settings();
        let request = ExportRequest::icon(
            &settings.export_path,
            &self.entries[index].asset().name(),
            settings.image_format,
            settings.image_width,
            settings.image_height,
        );
        let format = request.image_format().unwrap_or_default();
        let target = self.renderer.target().ok_or_else(|| {
            PropshotError::render("no render target to read back")
        })?;
        let bytes = self.encoder.encode(target, format)?;

        tracing::info!(
            path = %request.output_path.display(),
            bytes = bytes.len(),
            "Exporting icon"
        );
        Ok(self
            .writer
            .write(&self.scope, request.output_path, bytes, WritePolicy::Overwrite))
    }

    /// Framing for a freshly staged `asset`: the persisted record when one
    /// exists, otherwise a new record derived from the instance bounds.
    fn settings_for<H>(&mut self, host: &H, asset: &AssetRef, id: ObjectId) -> PrefabSettings
    where
        H: SceneHost + ?Sized,
    {
        if let Some(existing) = self.store.settings().find(asset) {
            return existing.clone();
        }
        let bounds = host
            .world_bounds(id)
            .unwrap_or_else(|| Bounds::at(Vec3::ZERO));
        let record =
            PrefabSettings::from_bounds(asset.clone(), bounds.center().y, bounds.size().to_array());
        self.store.update(|s| s.insert_if_absent(record.clone()));
        record
    }

    /// Write entry `index`'s framing back to its persisted record, if any.
    fn persist_entry(&mut self, index: usize) {
        let record = self.entries[index].settings.clone();
        if self.store.settings().find(&record.asset).is_some() {
            self.store.update(|s| s.upsert(record));
        }
    }

    fn ensure_camera<H>(&mut self, host: &mut H)
    where
        H: SceneHost + ?Sized,
    {
        let alive = self.camera.is_some_and(|id| host.camera(id).is_some());
        if !alive {
            let clear = clear_color_for(self.store.settings().image_format);
            self.camera = Some(host.create_camera(CameraRig {
                clear,
                ..CameraRig::default()
            }));
        }
    }

    /// Focus entry `index`: activate its instance, deactivate the others,
    /// collapse their advanced settings, and frame the camera.
    fn update_scene<H>(&mut self, host: &mut H, index: usize)
    where
        H: SceneHost + ?Sized,
    {
        self.ensure_camera(host);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if let Some(id) = entry.stage.id() {
                host.set_active(id, i == index);
            }
            if i != index {
                entry.advanced_open = false;
            }
        }
        self.focus = Some(index);
        self.apply_camera(host);
    }

    fn apply_camera<H>(&mut self, host: &mut H)
    where
        H: SceneHost + ?Sized,
    {
        let Some(camera) = self.camera else {
            return;
        };
        let clear = clear_color_for(self.store.settings().image_format);
        let rig = match self.focus.and_then(|i| self.entries.get(i)) {
            Some(entry) => CameraFraming::from_settings(&entry.settings).rig(clear),
            None => CameraRig {
                clear,
                ..host.camera(camera).unwrap_or_default()
            },
        };
        host.update_camera(camera, rig);
    }

    fn apply_lighting<H>(&mut self, host: &mut H)
    where
        H: SceneHost + ?Sized,
    {
        let settings = self.store.settings();
        host.set_lighting(Lighting {
            rotation: settings.light_rotation,
            mode: settings.lighting_mode,
        });
    }

    fn render<H>(&mut self, host: &mut H) -> PropshotResult<()>
    where
        H: SceneHost + ?Sized,
    {
        let settings = self.store.settings();
        let (width, height) = (settings.image_width, settings.image_height);
        self.renderer.render_now(host, self.camera, width, height)?;
        Ok(())
    }
}
