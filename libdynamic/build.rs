use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

// Fixture libraries loaded by the tests and benches, compiled from the
// workspace's sample plugins straight into OUT_DIR.
const FIXTURES: [(&str, &str); 2] = [
    ("plugin_dynamic", "../plugins/plugin_dynamic/src/lib.rs"),
    ("plugin_dynamic_alt", "../plugins/plugin_dynamic_alt/src/lib.rs"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let target = env::var("TARGET").unwrap();
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());

    // Expose the output directory to tests
    println!("cargo:rustc-env=TEST_ARTIFACTS={}", out_dir.display());

    for (crate_name, source) in FIXTURES {
        let source = Path::new(source);
        if !source.exists() {
            // Packaged without the workspace; tests needing fixtures will fail to find them.
            println!("cargo:warning=fixture source {} not found, skipping", source.display());
            continue;
        }
        println!("cargo:rerun-if-changed={}", source.display());

        let status = Command::new(&rustc)
            .arg(source)
            .arg("--crate-type=cdylib")
            .arg("--crate-name")
            .arg(crate_name)
            .arg("--edition=2021")
            .arg("--target")
            .arg(&target)
            .arg("-O")
            .arg("--out-dir")
            .arg(&out_dir)
            .status();

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => println!("cargo:warning=failed to compile fixture {} ({})", crate_name, status),
            Err(e) => println!("cargo:warning=failed to run {} for fixture {}: {}", rustc, crate_name, e),
        }
    }
}
