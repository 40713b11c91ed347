//! Checksum command: compute SHA-256 of a file.

use anyhow::Result;
use depot_core::checksum;
use std::path::Path;

/// Print the digest as base64 (the form manifests use), then as hex.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", checksum::to_base64(&digest), path.display());
    println!("{}  {}", checksum::to_hex(&digest), path.display());
    Ok(())
}
