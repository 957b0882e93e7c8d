//! Installs `.env.example` next to where spotseed looks for its `.env` file.

use std::{env, fs, path::PathBuf};

fn install_env_example() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push(env::var("CARGO_PKG_NAME")?);
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

fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    // read-only homes (CI, sandboxes) must not break the build
    if let Err(e) = install_env_example() {
        println!("cargo:warning=.env.example not installed: {}", e);
    }
}
