use std::collections::BTreeMap;
use anyhow::Context;
use roxmltree::Document;
use tracing::instrument;
use crate::map::parse;
use crate::{verify_assets, AssetLoader, AssetPath, FileProtocol, Gid, Location, Properties, Protocol, TileDefinition, TsxError, VerifyOptions};

/// Loader for a .tsx file.
/// Outputs a [`Tileset`].
#[derive(Copy, Clone, Default, Debug)]
pub struct TsxLoader {
    /// Checks referenced images after parsing. Only applies to files read with the "file" protocol.
    pub verify: Option<VerifyOptions>,
}

impl AssetLoader for TsxLoader {
    type AssetType = Tileset;

    fn load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Tileset> {
        let tileset = Tileset::parse_bytes(bytes).with_context(|| format!("Failed to load tileset {path}"))?;
        if let Some(options) = self.verify {
            if path.protocol == FileProtocol.name() {
                verify_assets(&tileset, path.directory(), options)
                    .with_context(|| format!("Failed to verify images of tileset {path}"))?;
            }
        }
        Ok(tileset)
    }

    fn extensions(&self) -> &[&str] {
        &["tsx"]
    }
}

/// A validated version of [`parse::Tileset`].
/// Every tile has a unique id and exactly one image with positive dimensions.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Tileset {
    pub version: String,
    pub tiled_version: String,
    pub name: String,
    pub class: String,
    /// Largest tile width in the set
    pub tile_width: u32,
    /// Largest tile height in the set
    pub tile_height: u32,
    /// Informational only. Tiled does not keep ids contiguous.
    pub tile_count: u32,
    pub columns: u32,
    pub grid: Option<Grid>,
    pub tile_offset: Option<TileOffset>,
    pub properties: Properties,
    pub tiles: BTreeMap<u32, TileDefinition>,
}

impl Tileset {

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, TsxError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    #[instrument(skip_all)]
    pub fn parse_str(source: &str) -> Result<Self, TsxError> {
        let doc = Document::parse(source)?;
        let parsed_tileset = parse::Tileset::parse_doc(&doc)?;
        Self::from_parsed(parsed_tileset)
    }

    /// Validates a parsed tileset.
    /// Fails on the first offending tile, in document order.
    /// Malformed values never get here: [`parse::Tileset::parse_doc`] rejects them on any tile first,
    /// so through [`Tileset::parse_str`] a parse error on a later tile wins over a validation error on an earlier one.
    pub fn from_parsed(parsed_tileset: parse::Tileset) -> Result<Self, TsxError> {
        if let Some(image) = &parsed_tileset.image {
            return Err(TsxError::UnsupportedAtlas { at: Location::new(None, image.line) });
        }

        let mut tiles = BTreeMap::new();
        let mut tile_lines = BTreeMap::new();
        for parsed_tile in parsed_tileset.tiles {
            let line = parsed_tile.line;
            let tile = validate_tile(parsed_tile)?;
            if let Some(first_line) = tile_lines.insert(tile.id, line) {
                return Err(TsxError::DuplicateId { id: tile.id, first_line, second_line: line });
            }
            tiles.insert(tile.id, tile);
        }

        if parsed_tileset.tile_count as usize != tiles.len() {
            log::debug!(
                "Tileset '{}' declares tilecount {} but defines {} tiles",
                parsed_tileset.name,
                parsed_tileset.tile_count,
                tiles.len(),
            );
        }

        Ok(Self {
            version: parsed_tileset.version,
            tiled_version: parsed_tileset.tiled_version,
            name: parsed_tileset.name,
            class: parsed_tileset.class,
            tile_width: parsed_tileset.tile_width,
            tile_height: parsed_tileset.tile_height,
            tile_count: parsed_tileset.tile_count,
            columns: parsed_tileset.columns,
            grid: parsed_tileset.grid,
            tile_offset: parsed_tileset.tile_offset,
            properties: parsed_tileset.properties,
            tiles,
        })
    }

    pub fn get(&self, id: u32) -> Option<&TileDefinition> {
        self.tiles.get(&id)
    }

    /// Looks up a tile by global id, for a map that starts this tileset at `first_gid`.
    pub fn tile_by_gid(&self, first_gid: u32, gid: Gid) -> Option<&TileDefinition> {
        self.get(gid.local_id(first_gid)?)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TileDefinition> {
        self.tiles.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.tiles.keys().copied()
    }
}

fn validate_tile(parsed_tile: parse::Tile) -> Result<TileDefinition, TsxError> {
    let Some(id) = parsed_tile.id else {
        return Err(TsxError::MissingAttribute {
            element: String::from("tile"),
            attribute: String::from("id"),
            at: Location::new(None, parsed_tile.line),
        })
    };

    let mut images = parsed_tile.images.into_iter();
    let image = match (images.next(), images.next()) {
        (Some(image), None) => image,
        (None, _) => return Err(TsxError::MissingElement {
            element: String::from("image"),
            parent: String::from("tile"),
            at: Location::new(Some(id), parsed_tile.line),
        }),
        (Some(_), Some(extra)) => return Err(TsxError::DuplicateElement {
            element: String::from("image"),
            at: Location::new(Some(id), extra.line),
        }),
    };
    let at = Location::new(Some(id), image.line);

    let image_path = image.source.ok_or_else(|| missing_image_attribute("source", at))?;
    if image_path.is_empty() {
        return Err(TsxError::EmptyAttribute {
            element: String::from("image"),
            attribute: String::from("source"),
            at,
        });
    }
    let width = image.width.ok_or_else(|| missing_image_attribute("width", at))?;
    let height = image.height.ok_or_else(|| missing_image_attribute("height", at))?;

    Ok(TileDefinition {
        id,
        image_path,
        width: positive_dimension(id, "width", width)?,
        height: positive_dimension(id, "height", height)?,
        class: parsed_tile.class,
        properties: parsed_tile.properties,
        objects: parsed_tile.objects,
    })
}

fn missing_image_attribute(attribute: &str, at: Location) -> TsxError {
    TsxError::MissingAttribute {
        element: String::from("image"),
        attribute: String::from(attribute),
        at,
    }
}

fn positive_dimension(id: u32, attribute: &str, value: i64) -> Result<u32, TsxError> {
    match u32::try_from(value) {
        Ok(dimension) if dimension > 0 => Ok(dimension),
        _ => Err(TsxError::InvalidDimension { id, attribute: String::from(attribute), value }),
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl Orientation {
    pub fn parse(str: &str) -> Option<Self> {
        match str {
            "orthogonal" => Some(Self::Orthogonal),
            "isometric" => Some(Self::Isometric),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

/// Grid used when placing tiles of an image collection in the editor.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Grid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}
