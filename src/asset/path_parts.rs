use std::fmt;
use std::path::PathBuf;
use crate::LoadError;

const SEPARATORS: [char; 2] = ['/', '\\'];

/**
 * Deconstructed path to a manifest, in the form "protocol://body.extension".
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct AssetPath {
    pub protocol: String,
    pub prefix: Option<String>,
    pub body: String,
    pub extension: String,
}

impl AssetPath {

    pub fn parse(path: &str, default_protocol: Option<&str>) -> Result<Self, LoadError> {
        let (protocol, remainder) = match path.split_once("://") {
            Some((protocol, remainder)) => (Some(protocol), remainder),
            None => (None, path),
        };
        let Some(protocol) = protocol.or(default_protocol) else {
            return Err(LoadError::NoDefaultProtocol)
        };

        // Extension is taken from the last path segment only, so "../maps/a.tsx" works
        let (body, extension) = match remainder.rsplit_once('.') {
            Some((body, extension)) if !extension.is_empty() && !extension.contains(SEPARATORS) => (body, extension),
            _ => return Err(LoadError::PathMissingExtension),
        };

        Ok(Self {
            protocol: protocol.into(),
            prefix: None,
            body: body.into(),
            extension: extension.into(),
        })
    }

    /// Body and extension. No protocol.
    pub fn without_protocol(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{}/{}.{}", prefix, self.body, self.extension),
            None => format!("{}.{}", self.body, self.extension),
        }
    }

    /// Parent directory of this file, relative to the prefix.
    /// Both '/' and '\' separate directories. None if it's at the root.
    pub fn parent(&self) -> Option<&str> {
        self.body.rsplit_once(SEPARATORS).map(|(parent, _)| parent)
    }

    /// Directory containing this file, prefix included.
    /// Images referenced by a manifest resolve against it.
    pub fn directory(&self) -> PathBuf {
        let mut directory = PathBuf::new();
        if let Some(prefix) = &self.prefix {
            directory.push(prefix);
        }
        if let Some(parent) = self.parent() {
            directory.push(parent);
        }
        directory
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.without_protocol())
    }
}
