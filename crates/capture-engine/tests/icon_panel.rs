mod common;

use propshot_capture_engine::{IconIntent, IconPanel};
use propshot_project_model::request::ImageFormat;
use propshot_project_model::settings::{AssetRef, IconSettings, LightingMode, PrefabSettings};
use propshot_project_model::store::SettingsStore;
use propshot_render_engine::{FileWriter, FrameEncoder, WriteOutcome};
use propshot_scene::software::SoftwareHost;
use propshot_scene::{ClearColor, SceneHost};

use common::{is_png, scratch, write_box};

fn small_store(dir: &std::path::Path) -> SettingsStore {
    let mut store = SettingsStore::open(dir.join("icon-settings.json")).unwrap();
    store.update(|s| {
        s.export_path = dir.join("icons");
        s.set_image_size(48, 48);
    });
    store
}

fn open_panel(host: &mut SoftwareHost, store: SettingsStore) -> IconPanel {
    IconPanel::open(
        host,
        store,
        FileWriter::current().unwrap(),
        FrameEncoder::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_register_derives_settings_from_bounds() {
    let dir = scratch("icon_register");
    let crate_asset = write_box(&dir, "Crate.obj", 1.0, 2.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));

    let index = panel.register(&mut host, &crate_asset).unwrap();
    assert_eq!(index, 0);
    assert_eq!(panel.focus(), Some(0));

    let record = panel.store().settings().find(&crate_asset).unwrap();
    assert!((record.original_y - 1.0).abs() < 1e-6);
    assert!((record.camera_size - 2.0).abs() < 1e-6);
    assert_eq!(panel.renderer().size(), Some((48, 48)));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_register_reuses_persisted_record() {
    let dir = scratch("icon_reuse");
    let asset = write_box(&dir, "Turtle.obj", 1.0, 1.0);
    let mut store = small_store(&dir);
    let mut persisted = PrefabSettings::from_bounds(asset.clone(), 7.0, [3.0, 3.0, 3.0]);
    persisted.set_offset(0.25, -0.5);
    persisted.camera_tilt = 20.0;
    store.update(|s| s.upsert(persisted.clone()));

    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, store);
    panel.register(&mut host, &asset).unwrap();
    panel.register(&mut host, &asset).unwrap();

    assert_eq!(panel.entries().len(), 2);
    assert_eq!(panel.entries()[0].settings(), &persisted);
    assert_eq!(panel.store().settings().settings.len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_only_focused_instance_is_active() {
    let dir = scratch("icon_focus");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 1.0, 3.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));

    panel.register(&mut host, &a).unwrap();
    panel.register(&mut host, &b).unwrap();
    let ids: Vec<_> = panel
        .entries()
        .iter()
        .map(|e| e.stage().id().unwrap())
        .collect();
    assert!(!host.is_active(ids[0]));
    assert!(host.is_active(ids[1]));

    panel.toggle_advanced(&mut host, 0).unwrap();
    assert!(host.is_active(ids[0]));
    assert!(!host.is_active(ids[1]));
    assert!(panel.entries()[0].advanced_open());

    panel.toggle_advanced(&mut host, 1).unwrap();
    assert!(!panel.entries()[0].advanced_open());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_framing_edits_persist_and_clamp() {
    let dir = scratch("icon_framing");
    let asset = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));
    panel.register(&mut host, &asset).unwrap();

    panel.set_framing(&mut host, 0, -4.0, 15.0, 90.0).unwrap();
    panel.set_offset(&mut host, 3.0, -0.5).unwrap();

    let record = panel.store().settings().find(&asset).unwrap();
    assert_eq!(record.camera_size, 0.0);
    assert_eq!(record.camera_tilt, 15.0);
    assert_eq!(record.camera_rotate, 90.0);
    assert_eq!(record.offset.to_array(), [1.0, -0.5]);

    let rig = host.camera(panel.camera().unwrap()).unwrap();
    assert_eq!(rig.tilt, 15.0);
    assert_eq!(rig.rotate, 90.0);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_remove_moves_focus_and_releases_target() {
    let dir = scratch("icon_remove");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 1.0, 1.0);
    let c = write_box(&dir, "C.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));
    for asset in [&a, &b, &c] {
        panel.register(&mut host, asset).unwrap();
    }

    panel.remove(&mut host, 1).unwrap();
    assert_eq!(panel.focus(), Some(1));
    assert_eq!(panel.entries()[1].asset(), &c);

    panel.remove(&mut host, 1).unwrap();
    assert_eq!(panel.focus(), Some(0));

    panel.remove(&mut host, 0).unwrap();
    assert_eq!(panel.focus(), None);
    assert_eq!(panel.renderer().size(), None);
    assert_eq!(host.object_count(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_export_current_writes_icon() {
    let dir = scratch("icon_export");
    let asset = write_box(&dir, "Turtle.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));

    assert!(panel.export_current(&mut host).unwrap().is_none());

    panel.register(&mut host, &asset).unwrap();
    let outcome = panel
        .export_current(&mut host)
        .unwrap()
        .unwrap()
        .wait()
        .await
        .unwrap();

    let expected = dir.join("icons").join("UI_Icon_Turtle.png");
    assert!(matches!(outcome, WriteOutcome::Written { ref path, .. } if *path == expected));
    assert!(is_png(&std::fs::read(&expected).unwrap()));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_export_all_raw_is_opaque_and_sized() {
    let dir = scratch("icon_export_all");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 2.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));
    panel.register(&mut host, &a).unwrap();
    panel.register(&mut host, &b).unwrap();
    panel.set_image_format(&mut host, ImageFormat::Raw).unwrap();
    assert_eq!(
        host.camera(panel.camera().unwrap()).unwrap().clear,
        ClearColor::White
    );

    let handles = panel.export_all(&mut host).unwrap();
    assert_eq!(handles.len(), 2);
    for handle in handles {
        handle.wait().await.unwrap();
    }

    for name in ["A", "B"] {
        let raw = std::fs::read(dir.join("icons").join(format!("UI_Icon_{name}.raw"))).unwrap();
        assert_eq!(raw.len(), 48 * 48 * 4);
        assert!(raw.chunks_exact(4).all(|px| px[3] == 255));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_close_prunes_missing_assets_and_commits() {
    let dir = scratch("icon_close");
    let asset = write_box(&dir, "Keep.obj", 1.0, 1.0);
    let mut store = small_store(&dir);
    store.update(|s| {
        s.upsert(PrefabSettings::from_bounds(
            AssetRef::new("Gone.obj"),
            0.0,
            [1.0; 3],
        ))
    });

    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, store);
    panel.register(&mut host, &asset).unwrap();
    panel.set_lighting_mode(&mut host, LightingMode::Warm).unwrap();

    panel.close(&mut host).unwrap();
    panel.close(&mut host).unwrap();
    assert_eq!(host.object_count(), 0);
    assert_eq!(host.camera_count(), 0);

    let reloaded = SettingsStore::load(dir.join("icon-settings.json")).unwrap();
    let settings: &IconSettings = reloaded.settings();
    assert_eq!(settings.settings.len(), 1);
    assert_eq!(settings.settings[0].asset, asset);
    assert_eq!(settings.lighting_mode, LightingMode::Warm);
    assert_eq!(settings.image_width, 48);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_dispatch_runs_intents_in_order() {
    let dir = scratch("icon_dispatch");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));

    let writes = panel
        .dispatch(
            &mut host,
            [
                IconIntent::Register(a.clone()),
                IconIntent::Register(b.clone()),
                IconIntent::SetImageFormat(ImageFormat::Jpg),
                IconIntent::SetLightRotation(45.0),
                IconIntent::ExportAll,
                IconIntent::Close,
                IconIntent::Register(a.clone()),
            ],
        )
        .unwrap();

    assert_eq!(writes.len(), 2);
    for handle in writes {
        handle.wait().await.unwrap();
    }
    assert!(dir.join("icons/UI_Icon_A.jpg").exists());
    assert!(dir.join("icons/UI_Icon_B.jpg").exists());
    assert!(panel.is_closed());
    assert_eq!(host.object_count(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_replace_swaps_instance_and_reuses_records() {
    let dir = scratch("icon_replace");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 1.0, 2.0);
    let c = write_box(&dir, "C.obj", 1.0, 3.0);
    let mut store = small_store(&dir);
    let mut persisted = PrefabSettings::from_bounds(b.clone(), 4.0, [5.0; 3]);
    persisted.camera_tilt = 20.0;
    store.update(|s| s.upsert(persisted.clone()));

    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, store);
    panel.register(&mut host, &a).unwrap();
    let old = panel.entries()[0].stage().id().unwrap();

    panel.replace(&mut host, 0, &b).unwrap();
    let new = panel.entries()[0].stage().id().unwrap();
    assert!(!host.contains(old));
    assert!(host.is_active(new));
    assert_eq!(host.object_count(), 1);
    assert_eq!(panel.entries()[0].asset(), &b);
    assert_eq!(panel.entries()[0].settings(), &persisted);

    panel
        .dispatch(
            &mut host,
            [
                IconIntent::Replace {
                    index: 0,
                    asset: c.clone(),
                },
                IconIntent::Replace {
                    index: 0,
                    asset: c.clone(),
                },
            ],
        )
        .unwrap();
    assert_eq!(host.object_count(), 1);
    let settings = panel.store().settings();
    assert_eq!(settings.settings.iter().filter(|r| r.asset == c).count(), 1);
    assert!((settings.find(&c).unwrap().camera_size - 3.0).abs() < 1e-6);
    assert_eq!(settings.find(&b), Some(&persisted));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_failed_replace_keeps_previous_asset() {
    let dir = scratch("icon_replace_missing");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));
    panel.register(&mut host, &a).unwrap();
    let id = panel.entries()[0].stage().id().unwrap();
    let framing = panel.entries()[0].settings().clone();

    let missing = AssetRef::new("Missing.obj");
    assert!(panel.replace(&mut host, 0, &missing).is_err());
    assert_eq!(panel.entries()[0].asset(), &a);
    assert_eq!(panel.entries()[0].settings(), &framing);
    assert_eq!(panel.entries()[0].stage().id(), Some(id));
    assert!(host.contains(id));
    assert_eq!(host.object_count(), 1);
    assert!(panel.store().settings().find(&missing).is_none());

    let handle = panel.export_current(&mut host).unwrap().unwrap();
    handle.wait().await.unwrap();
    let bytes = std::fs::read(dir.join("icons/UI_Icon_A.png")).unwrap();
    assert!(is_png(&bytes));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_calls_after_close_leave_scene_untouched() {
    let dir = scratch("icon_after_close");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut panel = open_panel(&mut host, small_store(&dir));
    panel.register(&mut host, &a).unwrap();
    panel.close(&mut host).unwrap();

    assert!(panel.register(&mut host, &a).is_err());
    panel.replace(&mut host, 0, &a).unwrap();
    panel.set_framing(&mut host, 0, 2.0, 10.0, 10.0).unwrap();
    panel.set_image_format(&mut host, ImageFormat::Jpg).unwrap();
    panel.refresh(&mut host).unwrap();
    assert!(panel.export_current(&mut host).unwrap().is_none());
    assert!(panel.export_all(&mut host).unwrap().is_empty());
    panel.close(&mut host).unwrap();

    assert_eq!(host.object_count(), 0);
    assert_eq!(host.camera_count(), 0);
    assert!(panel.entries().is_empty());
    assert_eq!(panel.store().settings().image_format, ImageFormat::Png);

    std::fs::remove_dir_all(&dir).ok();
}
