//! Build script for the site crate.
//!
//! Fingerprints the stylesheet so it can be served with immutable caching.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_stylesheet();
}

/// Hash `static/css/main.css` and publish a fingerprinted copy.
///
/// Sets `CSS_HASH` for `env!("CSS_HASH")`; templates link
/// `/static/css/derived/main.{hash}.css`.
fn fingerprint_stylesheet() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=stylesheet unavailable: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let fingerprint = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={fingerprint}");

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    let derived_path = derived_dir.join(format!("main.{fingerprint}.css"));
    let published = fs::create_dir_all(&derived_dir)
        .and_then(|()| fs::copy(&css_path, &derived_path).map(|_| ()));
    if let Err(e) = published {
        println!("cargo:warning=could not publish fingerprinted stylesheet: {e}");
    }
}
