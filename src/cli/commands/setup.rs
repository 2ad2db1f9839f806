//! Config file setup command.

use std::path::PathBuf;

use crate::config::{self, Config};

/// Write a config file with default settings
pub fn cmd_init_config(path: Option<&PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p.clone(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    config::save_to(&Config::default(), &path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_init_config(Some(&path), false).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[storage]"));

        std::fs::write(&path, "[json]\npath = \"mine.json\"\n").unwrap();
        assert!(cmd_init_config(Some(&path), false).is_err());
        assert_eq!(config::load_from(&path).json.path, PathBuf::from("mine.json"));

        cmd_init_config(Some(&path), true).unwrap();
        assert_eq!(config::load_from(&path).json.path, PathBuf::from("songs.json"));
    }
}
