use std::fmt;
use std::str::Utf8Error;
use derive_more::*;

/// Broad category of a [`TsxError`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ErrorKind {
    /// Document does not conform to the markup grammar, or a value could not be read.
    Parse,
    /// A required element or attribute is absent, repeated or empty.
    Schema,
    /// Two tiles share an id.
    DuplicateId,
    /// A width or height is not strictly positive, or disagrees with the image on disk.
    InvalidDimension,
    /// A referenced image could not be found or read.
    MissingAsset,
}

/// Where in a manifest something went wrong.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Location {
    pub tile_id: Option<u32>,
    /// 1-based line in the source document.
    pub line: u32,
}

impl Location {
    pub fn new(tile_id: Option<u32>, line: u32) -> Self {
        Self { tile_id, line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile_id {
            Some(tile_id) => write!(f, "tile {tile_id} (line {})", self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

#[derive(Error, Display, From, Debug)]
pub enum TsxError {
    #[display(fmt="Manifest is not valid UTF-8: {_0}")]
    Utf8(Utf8Error),
    #[display(fmt="Malformed XML: {_0}")]
    Xml(roxmltree::Error),
    #[display(fmt="Unexpected root element <{tag_name}>, expected <tileset>")]
    #[from(ignore)]
    UnexpectedRoot { tag_name: String },
    #[display(fmt="{at}: invalid value '{value}' for attribute '{attribute}' of <{element}>")]
    #[from(ignore)]
    InvalidAttributeValue { element: String, attribute: String, value: String, at: Location },
    #[display(fmt="{at}: <{element}> is missing required attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { element: String, attribute: String, at: Location },
    #[display(fmt="{at}: attribute '{attribute}' of <{element}> must not be empty")]
    #[from(ignore)]
    EmptyAttribute { element: String, attribute: String, at: Location },
    #[display(fmt="{at}: <{parent}> is missing required element <{element}>")]
    #[from(ignore)]
    MissingElement { element: String, parent: String, at: Location },
    #[display(fmt="{at}: element <{element}> may only appear once")]
    #[from(ignore)]
    DuplicateElement { element: String, at: Location },
    #[display(fmt="{at}: single-image tilesets are not supported, expected a collection of images")]
    #[from(ignore)]
    UnsupportedAtlas { at: Location },
    #[display(fmt="Duplicate tile id {id} (lines {first_line} and {second_line})")]
    #[from(ignore)]
    DuplicateId { id: u32, first_line: u32, second_line: u32 },
    #[display(fmt="Tile {id}: {attribute} must be positive, got {value}")]
    #[from(ignore)]
    InvalidDimension { id: u32, attribute: String, value: i64 },
    #[display(fmt="Tile {id}: declared size {declared_width}x{declared_height} does not match {path} ({actual_width}x{actual_height})")]
    #[from(ignore)]
    DimensionMismatch {
        id: u32,
        path: String,
        declared_width: u32,
        declared_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[display(fmt="Tile {id}: image '{path}' not found")]
    #[from(ignore)]
    MissingAsset { id: u32, path: String },
    #[display(fmt="Tile {id}: image '{path}' could not be read: {reason}")]
    #[from(ignore)]
    UnreadableAsset { id: u32, path: String, reason: String },
}

impl TsxError {

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Utf8(_) => ErrorKind::Parse,
            Self::Xml(_) => ErrorKind::Parse,
            Self::InvalidAttributeValue { .. } => ErrorKind::Parse,
            Self::UnexpectedRoot { .. } => ErrorKind::Schema,
            Self::MissingAttribute { .. } => ErrorKind::Schema,
            Self::EmptyAttribute { .. } => ErrorKind::Schema,
            Self::MissingElement { .. } => ErrorKind::Schema,
            Self::DuplicateElement { .. } => ErrorKind::Schema,
            Self::UnsupportedAtlas { .. } => ErrorKind::Schema,
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::InvalidDimension { .. } => ErrorKind::InvalidDimension,
            Self::DimensionMismatch { .. } => ErrorKind::InvalidDimension,
            Self::MissingAsset { .. } => ErrorKind::MissingAsset,
            Self::UnreadableAsset { .. } => ErrorKind::MissingAsset,
        }
    }

    /// Id of the offending tile, if the error concerns a single tile.
    pub fn tile_id(&self) -> Option<u32> {
        match self {
            Self::InvalidAttributeValue { at, .. }
            | Self::MissingAttribute { at, .. }
            | Self::EmptyAttribute { at, .. }
            | Self::MissingElement { at, .. }
            | Self::DuplicateElement { at, .. }
            | Self::UnsupportedAtlas { at } => at.tile_id,
            Self::DuplicateId { id, .. }
            | Self::InvalidDimension { id, .. }
            | Self::DimensionMismatch { id, .. }
            | Self::MissingAsset { id, .. }
            | Self::UnreadableAsset { id, .. } => Some(*id),
            Self::Utf8(_) | Self::Xml(_) | Self::UnexpectedRoot { .. } => None,
        }
    }
}
