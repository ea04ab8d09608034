use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::schema::DialogueConfig;

/// Command-line values that win over whatever the config file says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub saturn: bool,
    pub resource_root: Option<PathBuf>,
}

pub fn load_and_validate_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<DialogueConfig> {
    let mut config = match path {
        Some(path) => parse_config_file(path)?,
        None => DialogueConfig::default(),
    };

    if let Some(theme) = &overrides.theme {
        config.options.theme = theme.clone();
    }
    if overrides.saturn {
        config.options.saturn = true;
    }
    if let Some(root) = &overrides.resource_root {
        config.resources.root = root.clone();
    } else if let Some(path) = path {
        // Relative resource roots are resolved against the config file's directory.
        if config.resources.root.is_relative() {
            let config_dir = path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            config.resources.root = config_dir.join(&config.resources.root);
        }
    }

    config.validate().with_context(|| match path {
        Some(path) => format!("invalid config {}", path.display()),
        None => "invalid config".to_owned(),
    })?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<DialogueConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(DialogueConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })
}
