//! Build script for the knob firmware
//!
//! Adds the cortex-m-rt and defmt linker scripts to the firmware binary.
//! Host builds (`std` feature only) need no extra link arguments.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
