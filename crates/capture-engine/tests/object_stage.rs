mod common;

use glam::Vec3;
use propshot_capture_engine::ObjectStage;
use propshot_project_model::settings::AssetRef;
use propshot_scene::software::SoftwareHost;
use propshot_scene::{SceneHost, Transform};

use common::{scratch, write_box};

#[test]
fn test_stage_replaces_previous_instance() {
    let dir = scratch("stage_replace");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let b = write_box(&dir, "B.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut stage = ObjectStage::new();

    let first = stage.stage(&mut host, &a, Transform::IDENTITY).unwrap();
    let placement = Transform::from_position(Vec3::new(2.0, 0.0, 0.0));
    let second = stage.stage(&mut host, &b, placement).unwrap();

    assert!(!host.contains(first));
    assert!(host.contains(second));
    assert_eq!(host.object_count(), 1);
    assert_eq!(stage.object().unwrap().asset, b);
    assert_eq!(host.transform(second).unwrap(), placement);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_stage_freezes_rigid_body() {
    let dir = scratch("stage_physics");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut stage = ObjectStage::new();

    let id = stage.stage(&mut host, &a, Transform::IDENTITY).unwrap();
    let body = host.physics(id).unwrap();
    assert!(!body.simulated);
    assert!(!body.detect_collisions);

    let mut bare = SoftwareHost::new(&dir).with_rigid_bodies(false);
    let id = ObjectStage::new()
        .stage(&mut bare, &a, Transform::IDENTITY)
        .unwrap();
    assert!(bare.physics(id).is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_clear_is_idempotent() {
    let dir = scratch("stage_clear");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut stage = ObjectStage::new();

    stage.clear(&mut host);
    stage.stage(&mut host, &a, Transform::IDENTITY).unwrap();
    stage.clear(&mut host);
    stage.clear(&mut host);
    assert!(stage.is_empty());
    assert_eq!(host.object_count(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_failed_stage_keeps_previous_instance() {
    let dir = scratch("stage_missing");
    let a = write_box(&dir, "A.obj", 1.0, 1.0);
    let mut host = SoftwareHost::new(&dir);
    let mut stage = ObjectStage::new();
    let id = stage.stage(&mut host, &a, Transform::IDENTITY).unwrap();

    let missing = AssetRef::new("Missing.obj");
    assert!(stage.stage(&mut host, &missing, Transform::IDENTITY).is_err());
    assert_eq!(stage.id(), Some(id));
    assert_eq!(stage.object().unwrap().asset, a);
    assert!(host.contains(id));
    assert_eq!(host.object_count(), 1);

    let mut empty = ObjectStage::new();
    assert!(empty.stage(&mut host, &missing, Transform::IDENTITY).is_err());
    assert!(empty.is_empty());
    assert_eq!(host.object_count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}
