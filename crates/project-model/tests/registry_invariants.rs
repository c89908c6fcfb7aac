use proptest::prelude::*;
use propshot_project_model::request::frame_file_name;
use propshot_project_model::settings::{AssetRef, IconSettings, PrefabSettings};

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Upsert(u8, f32),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::Insert),
        (0u8..6, 0.0f32..10.0).prop_map(|(a, s)| Op::Upsert(a, s)),
        (0u8..6).prop_map(Op::Remove),
    ]
}

fn asset(id: u8) -> AssetRef {
    AssetRef::new(format!("props/asset_{id}.obj"))
}

proptest! {
    #[test]
    fn at_most_one_record_per_asset(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut settings = IconSettings::default();
        for op in ops {
            match op {
                Op::Insert(id) => {
                    settings.insert_if_absent(PrefabSettings::from_bounds(asset(id), 0.0, [1.0, 1.0, 1.0]));
                }
                Op::Upsert(id, size) => {
                    let mut record = PrefabSettings::from_bounds(asset(id), 0.0, [1.0, 1.0, 1.0]);
                    record.set_camera_size(size);
                    settings.upsert(record);
                }
                Op::Remove(id) => {
                    settings.remove(&asset(id));
                }
            }

            let mut seen = std::collections::HashSet::new();
            for record in &settings.settings {
                prop_assert!(seen.insert(record.asset.clone()));
            }
        }
    }

    #[test]
    fn frame_names_sort_in_capture_order(length in 1u32..2000) {
        let names: Vec<String> = (1..=length).map(|i| frame_file_name("Prop", i)).collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(&names, &sorted);
        prop_assert_eq!(names.first().map(String::as_str), Some("Prop0001.png"));
    }
}
