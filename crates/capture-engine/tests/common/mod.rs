#![allow(dead_code)]

use std::path::{Path, PathBuf};

use propshot_project_model::settings::AssetRef;

/// Fresh scratch directory under the system temp dir.
pub fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("propshot_it_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a box mesh spanning `x,z in [-w/2, w/2]`, `y in [0, h]`.
pub fn write_box(dir: &Path, file: &str, w: f32, h: f32) -> AssetRef {
    let x = w / 2.0;
    let obj = format!(
        "o box\n\
         v {nx} 0 {nx}\nv {x} 0 {nx}\nv {x} {h} {nx}\nv {nx} {h} {nx}\n\
         v {nx} 0 {x}\nv {x} 0 {x}\nv {x} {h} {x}\nv {nx} {h} {x}\n\
         f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 3 4 8 7\nf 2 3 7 6\nf 1 5 8 4\n",
        nx = -x,
    );
    std::fs::write(dir.join(file), obj).unwrap();
    AssetRef::new(file)
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x89, b'P', b'N', b'G'])
}
