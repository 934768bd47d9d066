use std::any::TypeId;
use anyhow::Context;
use derive_more::*;
use tracing::instrument;
use crate::{Asset, AssetLoader, AssetPath, DynLoader, FileProtocol, HashMap, LoaderConfig, Protocol, TsxLoader, VerifyOptions};

/// Reads manifests through registered protocols and turns them into assets with the loader matching their extension.
/// Loading is synchronous, and every call reads the file again.
pub struct AssetManager {
    path_prefix: Option<String>,
    protocols: HashMap<String, Box<dyn Protocol>>,
    default_protocol: Option<String>,
    loaders: Vec<Box<dyn DynLoader>>,
    extension_to_loader: HashMap<String, usize>,
}

impl AssetManager {

    pub fn new() -> Self {
        Self {
            path_prefix: None,
            protocols: HashMap::default(),
            default_protocol: None,
            loaders: Vec::default(),
            extension_to_loader: HashMap::default(),
        }
    }

    /// Manager reading from the file system with a [`TsxLoader`], set up from a config.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, LoadError> {
        let mut manager = Self::new();
        manager.set_path_prefix(config.asset_root.clone());
        manager.add_protocol(FileProtocol, config.default_protocol == FileProtocol.name());
        if manager.default_protocol.is_none() {
            return Err(LoadError::NoSuchProtocol);
        }
        let verify = config.verify_assets.then_some(VerifyOptions {
            check_dimensions: config.check_dimensions,
        });
        manager.try_add_loader(TsxLoader { verify })?;
        Ok(manager)
    }

    pub fn set_path_prefix<S: Into<String>>(&mut self, prefix: Option<S>) {
        self.path_prefix = prefix.map(|s| s.into());
    }

    /// Adds a protocol for use in loading bytes for asset loaders.
    pub fn add_protocol(&mut self, protocol: impl Protocol, is_default: bool) {
        let name = String::from(protocol.name());
        self.protocols.insert(name.clone(), Box::new(protocol));
        if is_default {
            self.default_protocol = Some(name);
        }
    }

    /// Adds a loader for transforming file bytes into assets.
    pub fn try_add_loader(&mut self, loader: impl AssetLoader) -> Result<(), LoadError> {
        for extension in loader.extensions() {
            if self.extension_to_loader.contains_key(*extension) {
                return Err(LoadError::ExtensionOverlaps);
            }
        }
        let loader_index = self.loaders.len();
        for extension in loader.extensions() {
            self.extension_to_loader.insert(String::from(*extension), loader_index);
        }
        self.loaders.push(Box::new(loader));
        Ok(())
    }

    /// Parses a path using the configured default protocol and prefix.
    pub fn resolve(&self, path: &str) -> Result<AssetPath, LoadError> {
        let mut path = AssetPath::parse(path, self.default_protocol.as_deref())?;
        path.prefix = self.path_prefix.clone();
        Ok(path)
    }

    /// Reads and loads an asset.
    /// Fails without producing anything if reading, parsing or validation fails.
    #[instrument(skip_all)]
    pub fn load<A: Asset>(&self, path: impl AsRef<str>) -> anyhow::Result<A> {
        let path = self.resolve(path.as_ref())?;
        let protocol = match self.protocols.get(&path.protocol) {
            Some(protocol) => protocol,
            None => return Err(LoadError::NoSuchProtocol.into()),
        };
        let loader = match self.extension_to_loader.get(&path.extension) {
            Some(loader_idx) => &self.loaders[*loader_idx],
            None => return Err(LoadError::NoSuchLoader.into()),
        };
        if loader.asset_type() != TypeId::of::<A>() {
            return Err(LoadError::IncorrectAssetType.into());
        }

        log::debug!("Loading {path}");
        let bytes = protocol.read(&path)?;
        let dyn_asset = loader.dyn_load(&bytes, &path)?;
        let asset = dyn_asset
            .downcast::<A>()
            .map_err(|_| LoadError::IncorrectAssetType)
            .with_context(|| format!("Loader for '{}' produced an unexpected type", path.extension))?;
        Ok(*asset)
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug, Display, Clone, Eq, PartialEq)]
pub enum LoadError {
    #[display(fmt="Incorrect asset type")]
    IncorrectAssetType,
    #[display(fmt="No default protocol")]
    NoDefaultProtocol,
    #[display(fmt="No such protocol")]
    NoSuchProtocol,
    #[display(fmt="No loader matching extension")]
    NoSuchLoader,
    #[display(fmt="Path missing extension")]
    PathMissingExtension,
    #[display(fmt="Supported extension of one loader overlaps with another")]
    ExtensionOverlaps,
}

#[cfg(test)]
mod test {
    use crate::map::ErrorKind;
    use crate::{LoaderConfig, MemoryProtocol, RawProtocol, Tileset, TsxError, TsxLoader};
    use super::{AssetManager, LoadError};

    const OBJECTS_TSX: &str = include_str!("../../assets/Objects.tsx");

    fn memory_manager() -> AssetManager {
        let protocol = MemoryProtocol::default()
            .with_file("game/objects/Objects.tsx", OBJECTS_TSX)
            .with_file("game/broken.tsx", r#"<tileset><tile id="1"><image width="0" height="4" source="a.png"/></tile></tileset>"#);
        let mut manager = AssetManager::new();
        manager.add_protocol(protocol, true);
        manager.try_add_loader(TsxLoader::default()).unwrap();
        manager
    }

    #[test]
    fn loads_by_extension() {
        let manager = memory_manager();
        let tileset = manager.load::<Tileset>("game/objects/Objects.tsx").unwrap();
        assert_eq!(46, tileset.len());

        // Loading again yields the same result
        let again = manager.load::<Tileset>("mem://game/objects/Objects.tsx").unwrap();
        assert_eq!(tileset, again);
    }

    #[test]
    fn surfaces_validation_errors() {
        let manager = memory_manager();
        let err = manager.load::<Tileset>("game/broken.tsx").unwrap_err();
        let tsx_error = err.downcast_ref::<TsxError>().unwrap();
        assert_eq!(ErrorKind::InvalidDimension, tsx_error.kind());
        assert_eq!(Some(1), tsx_error.tile_id());
    }

    #[test]
    fn load_errors() {
        let manager = memory_manager();
        let cases = [
            ("game/objects/Objects.tmx", LoadError::NoSuchLoader),
            ("http://game/objects/Objects.tsx", LoadError::NoSuchProtocol),
            ("game/objects/Objects", LoadError::PathMissingExtension),
        ];
        for (path, expected) in cases {
            let err = manager.load::<Tileset>(path).unwrap_err();
            assert_eq!(Some(&expected), err.downcast_ref::<LoadError>(), "{path}");
        }

        let err = manager.load::<String>("game/objects/Objects.tsx").unwrap_err();
        assert_eq!(Some(&LoadError::IncorrectAssetType), err.downcast_ref::<LoadError>());
    }

    #[test]
    fn no_default_protocol() {
        let mut manager = AssetManager::new();
        manager.add_protocol(RawProtocol::from(OBJECTS_TSX), false);
        manager.try_add_loader(TsxLoader::default()).unwrap();
        let err = manager.load::<Tileset>("Objects.tsx").unwrap_err();
        assert_eq!(Some(&LoadError::NoDefaultProtocol), err.downcast_ref::<LoadError>());
        assert!(manager.load::<Tileset>("raw://Objects.tsx").is_ok());
    }

    #[test]
    fn overlapping_extensions() {
        let mut manager = AssetManager::new();
        manager.try_add_loader(TsxLoader::default()).unwrap();
        assert_eq!(Err(LoadError::ExtensionOverlaps), manager.try_add_loader(TsxLoader::default()));
    }

    #[test]
    fn from_config() {
        let config = LoaderConfig {
            asset_root: Some(String::from("assets")),
            ..Default::default()
        };
        let manager = AssetManager::from_config(&config).unwrap();
        let path = manager.resolve("Objects.tsx").unwrap();
        assert_eq!("file://assets/Objects.tsx", path.to_string());

        let config = LoaderConfig { default_protocol: String::from("ftp"), ..Default::default() };
        assert!(matches!(AssetManager::from_config(&config), Err(LoadError::NoSuchProtocol)));
    }
}
