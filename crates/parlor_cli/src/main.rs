//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `parlor_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe to validate core crate wiring independently from the
    // UI/FFI runtime setup.
    println!("parlor_core ping={}", parlor_core::ping());
    println!("parlor_core version={}", parlor_core::core_version());
}
