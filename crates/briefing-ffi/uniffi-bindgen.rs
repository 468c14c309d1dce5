//! Binding generator for the Kotlin (and Swift) shells
//!
//! Usage:
//!   cargo run -p briefing-ffi --features bindgen --bin uniffi-bindgen generate \
//!       --library target/aarch64-linux-android/release/libbriefing_ffi.so \
//!       --language kotlin \
//!       --out-dir app/src/main/java

fn main() {
    uniffi::uniffi_bindgen_main()
}
