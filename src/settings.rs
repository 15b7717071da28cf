use serde::Deserialize;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use anyhow::{Context, Result};
use log::debug;

use crate::delivery::TlsMode;

// Defaults for a mail relay, overridden by anything given on the command line
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
    pub tls: Option<TlsMode>,
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    // Open the YAML file
    let file = File::open(path)
        .with_context(|| format!("Cannot open settings file {}", path.display()))?;
    let reader = BufReader::new(file);

    // Parse the YAML file into the Settings struct
    let settings: Settings = serde_yaml::from_reader(reader)
        .with_context(|| format!("Cannot deserialize settings file {}", path.display()))?;

    debug!("settings loaded from {}", path.display());
    Ok(settings)
}
