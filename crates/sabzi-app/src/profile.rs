use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use sabzi_config::Config;
use serde::{Deserialize, Serialize};

/// A named config saved on disk
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Named(Profile),
    Bare(Config),
}

/// Load a JSON profile; accepts `{"name", "value"}` or a bare config object
pub fn load_profile(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading profile from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let profile: ProfileFile = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", path.display()))?;

    let config = match profile {
        ProfileFile::Named(profile) => {
            tracing::info!("Using profile '{}'", profile.name);
            profile.value
        }
        ProfileFile::Bare(config) => config,
    };
    Ok(config.normalize())
}
