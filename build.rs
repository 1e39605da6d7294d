//! Build script for discogs-sync.
//!
//! Copies `.env.example` from the crate root into the application's local data
//! directory, next to where [`load_env`] looks for `.env`:
//!
//! - Linux: `~/.local/share/discogs-sync/.env.example`
//! - macOS: `~/Library/Application Support/discogs-sync/.env.example`
//! - Windows: `%LOCALAPPDATA%/discogs-sync/.env.example`
//!
//! A missing template only produces a cargo warning.
//!
//! [`load_env`]: https://docs.rs/discogs-sync/latest/discogs_sync/config/fn.load_env.html

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("discogs-sync");
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        fs::copy(&env_example_path, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
