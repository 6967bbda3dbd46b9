use std::env;

fn main() {
    // Version string shown by --version, overridable for packaged builds
    let version = env::var("STITCH_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=STITCH_VERSION={}", version);

    println!("cargo:rerun-if-env-changed=STITCH_VERSION");
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
