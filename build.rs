use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // This tells Cargo to rerun this script if something in /assets/ changes.
    println!("cargo:rerun-if-changed=assets/*");

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    // The viewer resolves its asset paths relative to ./assets at runtime, so
    // ship the directory next to the build output when it exists.
    if manifest_dir.join("assets").exists() {
        copy_items(&["assets/"], out_dir, &copy_options)?;
    }

    Ok(())
}
