use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings for loading manifests, usually read from a YAML file.
/// Keys left out of the file take their default value.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory that manifest paths are relative to.
    pub asset_root: Option<String>,
    /// Protocol used for paths without "protocol://".
    pub default_protocol: String,
    /// Checks that every referenced image exists.
    pub verify_assets: bool,
    /// Also compares image sizes with the declared ones. Requires `verify_assets`.
    pub check_dimensions: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: None,
            default_protocol: String::from("file"),
            verify_assets: false,
            check_dimensions: false,
        }
    }
}

impl LoaderConfig {

    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(source)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config '{}'", path.display()))?;
        Self::from_yaml(&source).with_context(|| format!("Invalid config '{}'", path.display()))
    }
}

#[cfg(test)]
mod test {
    use super::LoaderConfig;

    #[test]
    fn partial_yaml() {
        let config = LoaderConfig::from_yaml("asset_root: assets/game\nverify_assets: true\n").unwrap();
        assert_eq!(Some(String::from("assets/game")), config.asset_root);
        assert_eq!("file", config.default_protocol);
        assert!(config.verify_assets);
        assert!(!config.check_dimensions);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = LoaderConfig::from_yaml("{}").unwrap();
        assert_eq!(LoaderConfig::default(), config);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(LoaderConfig::from_yaml("verify_assets: sometimes").is_err());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("loader.yaml");
        std::fs::write(&path, "check_dimensions: true\n").unwrap();
        let config = LoaderConfig::from_file(&path).unwrap();
        assert!(config.check_dimensions);
        assert!(LoaderConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}
