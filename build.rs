// Build script that mirrors the static portfolio page into `dist/`.
// The wasm bundle itself is produced by `cargo run` (see src/main.rs); running
// wasm-pack from here would re-enter cargo on the same target directory.
use std::{fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    // Copy static/ to dist/
    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    fs::create_dir_all(out_dir).ok();

    let static_dir = Path::new("static");
    if static_dir.exists() {
        let mut options = CopyOptions::new();
        options.content_only = true;
        options.overwrite = true;
        if let Err(err) = copy(static_dir, out_dir, &options) {
            println!("cargo:warning=copying static/ to dist/ failed: {err}");
        }
    }
}
