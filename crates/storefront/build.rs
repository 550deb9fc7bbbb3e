//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so templates can append a cache-busting
//! version to its URL.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_stylesheet();
}

/// Hash `static/css/shop.css` and expose the first 8 hex chars as `CSS_HASH`.
fn fingerprint_stylesheet() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/shop.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = Sha256::digest(&content);
            format!("{digest:x}").chars().take(8).collect::<String>()
        }
        Err(e) => {
            println!("cargo:warning=Could not read shop.css: {e}");
            String::new()
        }
    };

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
