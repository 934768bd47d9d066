use anyhow::Context;
use crate::{AssetPath, HashMap};

/**
 * A method of receiving the bytes of a manifest.
 * IE: file, raw, mem.
 */
pub trait Protocol: Send + Sync + 'static {
    /**
     * Name of the protocol, as written before "://" in a path.
     * Should not change across invocations.
     */
    fn name(&self) -> &str;
    /**
     * Retrieves raw bytes from the path specified.
     */
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
}

/**
 * Reads from the file system, relative to the working directory.
 */
#[derive(Copy, Clone, Debug)]
pub struct FileProtocol;
impl Protocol for FileProtocol {
    fn name(&self) -> &str { "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let fs_path = path.without_protocol();
        std::fs::read(&fs_path).with_context(|| format!("Could not read '{fs_path}'"))
    }
}

/**
 * Always returns the bytes it stores, whatever the path.
 */
#[derive(Clone, Debug)]
pub struct RawProtocol(pub Vec<u8>);
impl From<&str> for RawProtocol {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}
impl Protocol for RawProtocol {
    fn name(&self) -> &str { "raw" }
    fn read(&self, _path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/**
 * In-memory files keyed by path without protocol.
 * Lets several manifests be served without touching the disk.
 */
#[derive(Clone, Default, Debug)]
pub struct MemoryProtocol {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryProtocol {
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl Protocol for MemoryProtocol {
    fn name(&self) -> &str { "mem" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let key = path.without_protocol();
        match self.files.get(&key) {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("No in-memory file '{key}'"),
        }
    }
}
