// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Get the output directory set by Cargo
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    // Stamped into the startup banner
    let build_date = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();

    fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date),
    )
    .expect("write build_info.rs");

    println!("cargo:rerun-if-changed=build.rs");
}
