//! Regenerate `include/camera_localizer.h` from the exported symbols.

use std::{error::Error, fs, path::Path};

fn main() -> Result<(), Box<dyn Error>> {
    let crate_dir = env!("CARGO_MANIFEST_DIR");
    let include = Path::new(crate_dir).join("include");
    fs::create_dir_all(&include)?;
    let header = include.join("camera_localizer.h");

    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CAMERA_LOCALIZER_H")
        .with_sys_include("stddef.h")
        .with_documentation(true)
        .generate()?;
    bindings.write_to_file(&header);
    println!("wrote {}", header.display());
    Ok(())
}
