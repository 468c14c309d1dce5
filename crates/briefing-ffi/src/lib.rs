//! UniFFI bindings crate for the briefing library
//!
//! Wraps the briefing crate for UniFFI library-mode binding generation and
//! re-exports its FFI module and scaffolding.
//!
//! ## Building for Android
//!
//! 1. Build the shared library for each ABI (with cargo-ndk):
//!    ```bash
//!    cargo ndk -t arm64-v8a -t x86_64 -o app/src/main/jniLibs \
//!        build --release -p briefing-ffi
//!    ```
//!
//! 2. Generate Kotlin bindings:
//!    ```bash
//!    cargo run -p briefing-ffi --features bindgen --bin uniffi-bindgen generate \
//!        --library target/aarch64-linux-android/release/libbriefing_ffi.so \
//!        --language kotlin \
//!        --out-dir app/src/main/java
//!    ```

pub use briefing::ffi::*;

// Library mode needs the scaffolding re-exported from this cdylib
briefing::uniffi_reexport_scaffolding!();
