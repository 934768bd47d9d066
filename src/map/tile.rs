use std::path::{Path, PathBuf};
use crate::HashMap;

/// Custom properties attached to a tileset or tile, keyed by name.
pub type Properties = HashMap<String, PropertyValue>;

/// A single tile in an image-collection tileset.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct TileDefinition {
    /// ID of tile local to its tileset
    pub id: u32,
    /// Image path relative to the manifest
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub class: String,
    pub properties: Properties,
    pub objects: Vec<TileObject>,
}

impl TileDefinition {

    /// Joins the image path onto the directory containing the manifest.
    pub fn resolve_image(&self, manifest_dir: impl AsRef<Path>) -> PathBuf {
        manifest_dir.as_ref().join(&self.image_path)
    }

    /// First object of class "collider", if any.
    pub fn collider(&self) -> Option<&TileObject> {
        self.objects.iter().find(|object| object.class == "collider")
    }

    /// Global id of this tile in a map that starts this tileset at `first_gid`.
    pub fn gid(&self, first_gid: u32) -> Option<Gid> {
        first_gid.checked_add(self.id).map(Gid)
    }
}

/// Global tile id, as used by maps referencing a tileset.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, Ord, PartialOrd)]
pub struct Gid(pub u32);

impl Gid {
    /// Id local to the tileset that starts at `first_gid`.
    /// None if this gid belongs to an earlier tileset.
    pub fn local_id(self, first_gid: u32) -> Option<u32> {
        self.0.checked_sub(first_gid)
    }
}

/// Shape placed in a tile's object group, typically a collider.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct TileObject {
    pub id: u32,
    pub name: String,
    pub class: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: ObjectShape,
}

#[derive(Clone, PartialEq, Default, Debug)]
pub enum ObjectShape {
    #[default]
    Rectangle,
    Ellipse,
    Point,
    /// Points relative to the object's position
    Polygon(Vec<(f32, f32)>),
    Polyline(Vec<(f32, f32)>),
}

#[derive(Clone, PartialEq, Debug)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f32),
    Bool(bool),
    /// Color in "#AARRGGBB" form, as Tiled writes it
    Color(String),
    File(String),
    /// Id of a referenced object
    Object(u32),
    /// Instance of a custom class, holding its own nested members
    Class { property_type: String, properties: Properties },
}

impl PropertyValue {

    const TYPES: &'static [&'static str] = &["string", "int", "float", "bool", "color", "file", "object"];

    /// True for types whose value is a single attribute. Classes are parsed from nested properties instead.
    pub fn is_known_type(type_name: &str) -> bool {
        Self::TYPES.contains(&type_name)
    }

    /// Parses a value of the given Tiled property type.
    /// None if the type is unknown, is "class", or the value does not fit it.
    pub fn parse(type_name: &str, value: &str) -> Option<Self> {
        let property = match type_name {
            "string" => Self::String(String::from(value)),
            "int" => Self::Int(value.trim().parse().ok()?),
            "float" => Self::Float(value.trim().parse().ok()?),
            "bool" => match value.trim() {
                "true" => Self::Bool(true),
                "false" => Self::Bool(false),
                _ => return None,
            },
            "color" => Self::Color(String::from(value)),
            "file" => Self::File(String::from(value)),
            "object" => Self::Object(value.trim().parse().ok()?),
            _ => return None,
        };
        Some(property)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
            Self::File(_) => "file",
            Self::Object(_) => "object",
            Self::Class { .. } => "class",
        }
    }

    /// Value as it is written in a manifest.
    pub fn to_value_string(&self) -> String {
        match self {
            Self::String(value) | Self::Color(value) | Self::File(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Object(value) => value.to_string(),
            Self::Class { .. } => String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Gid, PropertyValue, TileDefinition};
    use std::path::Path;

    #[test]
    fn resolves_relative_to_manifest() {
        let tile = TileDefinition {
            id: 23,
            image_path: String::from("bed.webp"),
            width: 1796,
            height: 1125,
            ..Default::default()
        };
        let path = tile.resolve_image("assets/game/objects");
        assert_eq!(Path::new("assets/game/objects/bed.webp"), path);
    }

    #[test]
    fn gid_round_trip() {
        let tile = TileDefinition { id: 22, ..Default::default() };
        let gid = tile.gid(47).unwrap();
        assert_eq!(Gid(69), gid);
        assert_eq!(None, tile.gid(u32::MAX));
        assert_eq!(Some(22), gid.local_id(47));
        assert_eq!(None, Gid(3).local_id(47));
    }

    #[test]
    fn property_values() {
        assert_eq!(Some(PropertyValue::Int(-4)), PropertyValue::parse("int", " -4"));
        assert_eq!(Some(PropertyValue::Bool(true)), PropertyValue::parse("bool", "true"));
        assert_eq!(None, PropertyValue::parse("bool", "yes"));
        assert_eq!(None, PropertyValue::parse("float", "fast"));
        assert_eq!(None, PropertyValue::parse("matrix", "1"));
        assert_eq!("1.5", PropertyValue::Float(1.5).to_value_string());
    }
}
