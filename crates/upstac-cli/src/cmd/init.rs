use anyhow::Context;
use std::path::Path;
use upstac_core::{config::Config, io, paths};

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upstac".to_string()),
    };

    println!("Initializing upstac in: {}", root.display());

    for dir in [paths::UPSTAC_DIR, paths::REQUESTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    println!("\nNext: upstac user add <name> --role tester");
    Ok(())
}
