//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lumina_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("lumina_core version={}", lumina_core::core_version());
    println!(
        "lumina_core schema_version={}",
        lumina_core::db::migrations::latest_version()
    );
}
