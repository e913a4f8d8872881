//! Fuzz target for the container envelope decoder.
//!
//! Feeds arbitrary bytes through format detection and `decrypt_config`.
//! Must never panic.
//!
//! # Usage
//!
//! ```sh
//! cargo +nightly install cargo-fuzz
//!
//! # Run from the confseal-container crate directory:
//! cd crates/confseal-container
//! cargo +nightly fuzz run container_decode -- -max_len=8192
//! ```

#![no_main]

use confseal_container::{decrypt_config, is_encrypted, EncryptedContainer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = is_encrypted(&document);
    let Ok(container) = serde_json::from_value::<EncryptedContainer>(document) else {
        return;
    };
    // The stored work factor is attacker-controlled; keep runs fast.
    if container.encryption.iterations > 64 {
        return;
    }
    let _ = decrypt_config::<serde_json::Value>(&container, "fuzz");
});
