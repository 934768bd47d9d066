use roxmltree::{Document, Node};
use crate::map::{Grid, Location, ObjectShape, Orientation, Properties, PropertyValue, TileObject, TileOffset, TsxError};
use super::{invalid_value, line_of, parse_value};


/// A 1:1 mapping of the tsx <tileset> element.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Tileset {
    pub version: String,
    pub tiled_version: String,
    pub name: String,
    pub class: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub grid: Option<Grid>,
    pub tile_offset: Option<TileOffset>,
    pub properties: Properties,
    /// Single atlas image. Only present in tilesets that are not image collections.
    pub image: Option<Image>,
    pub tiles: Vec<Tile>,
    pub line: u32,
}

impl Tileset {

    pub fn parse_doc(doc: &Document) -> Result<Self, TsxError> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "tileset" {
            return Err(TsxError::UnexpectedRoot { tag_name: String::from(tag_name) });
        }
        let mut tileset = Tileset::default();
        tileset.parse(root)?;
        Ok(tileset)
    }

    pub fn parse(&mut self, tileset_node: Node) -> Result<(), TsxError> {
        self.line = line_of(tileset_node);

        // Parses attributes
        for attribute in tileset_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "version" => self.version = String::from(value),
                "tiledversion" => self.tiled_version = String::from(value),
                "name" => self.name = String::from(value),
                "class" => self.class = String::from(value),
                "tilewidth" => self.tile_width = parse_value(tileset_node, name, value, None)?,
                "tileheight" => self.tile_height = parse_value(tileset_node, name, value, None)?,
                "tilecount" => self.tile_count = parse_value(tileset_node, name, value, None)?,
                "columns" => self.columns = parse_value(tileset_node, name, value, None)?,
                _ => {}
            }
        }

        // Parses children
        for child in tileset_node.children().filter(|node| node.is_element()) {
            match child.tag_name().name() {
                "grid" => self.grid = Some(parse_grid(child)?),
                "tileoffset" => self.tile_offset = Some(parse_tile_offset(child)?),
                "properties" => self.properties = parse_properties(child, None)?,
                "image" => self.image = Some(Image::parse(child, None)?),
                "tile" => self.tiles.push(Tile::parse(child)?),
                _ => {}
            }
        }
        Ok(())
    }
}

/// A 1:1 mapping of a tsx <tile> element.
/// Required parts are optional here so that validation can report what is missing.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Tile {
    pub id: Option<u32>,
    pub class: String,
    pub images: Vec<Image>,
    pub properties: Properties,
    pub objects: Vec<TileObject>,
    pub line: u32,
}

impl Tile {
    pub fn parse(tile_node: Node) -> Result<Self, TsxError> {
        let mut tile = Tile {
            line: line_of(tile_node),
            ..Default::default()
        };

        // Id first, so that later errors can name the tile
        if let Some(value) = tile_node.attribute("id") {
            tile.id = Some(parse_value(tile_node, "id", value, None)?);
        }
        for attribute in tile_node.attributes() {
            match attribute.name() {
                "type" | "class" => tile.class = String::from(attribute.value()),
                _ => {}
            }
        }

        for child in tile_node.children().filter(|node| node.is_element()) {
            match child.tag_name().name() {
                "image" => tile.images.push(Image::parse(child, tile.id)?),
                "properties" => tile.properties = parse_properties(child, tile.id)?,
                "objectgroup" => {
                    for object_node in child.children().filter(|node| node.has_tag_name("object")) {
                        tile.objects.push(parse_object(object_node, tile.id)?);
                    }
                },
                _ => {}
            }
        }
        Ok(tile)
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    pub format: String,
    pub source: Option<String>,
    pub trans: Option<String>,
    /// Signed so that negative sizes can be reported as invalid dimensions rather than parse errors.
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub line: u32,
}

impl Image {
    pub fn parse(image_node: Node, tile_id: Option<u32>) -> Result<Image, TsxError> {
        let mut image = Image {
            line: line_of(image_node),
            ..Default::default()
        };
        for attribute in image_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "format" => image.format = String::from(value),
                "source" => image.source = Some(String::from(value)),
                "trans" => image.trans = Some(String::from(value)),
                "width" => image.width = Some(parse_value(image_node, name, value, tile_id)?),
                "height" => image.height = Some(parse_value(image_node, name, value, tile_id)?),
                _ => {}
            }
        }
        Ok(image)
    }
}

fn parse_grid(grid_node: Node) -> Result<Grid, TsxError> {
    let mut grid = Grid::default();
    for attribute in grid_node.attributes() {
        let name = attribute.name();
        let value = attribute.value();
        match name {
            "orientation" => grid.orientation = Orientation::parse(value)
                .ok_or_else(|| invalid_value(grid_node, name, value, None))?,
            "width" => grid.width = parse_value(grid_node, name, value, None)?,
            "height" => grid.height = parse_value(grid_node, name, value, None)?,
            _ => {}
        }
    }
    Ok(grid)
}

fn parse_tile_offset(offset_node: Node) -> Result<TileOffset, TsxError> {
    let mut offset = TileOffset::default();
    for attribute in offset_node.attributes() {
        let name = attribute.name();
        let value = attribute.value();
        match name {
            "x" => offset.x = parse_value(offset_node, name, value, None)?,
            "y" => offset.y = parse_value(offset_node, name, value, None)?,
            _ => {}
        }
    }
    Ok(offset)
}

fn parse_properties(properties_node: Node, tile_id: Option<u32>) -> Result<Properties, TsxError> {
    let mut properties = Properties::default();
    for property_node in properties_node.children().filter(|node| node.has_tag_name("property")) {
        let name = property_node
            .attribute("name")
            .ok_or_else(|| TsxError::MissingAttribute {
                element: String::from("property"),
                attribute: String::from("name"),
                at: Location::new(tile_id, line_of(property_node)),
            })?;
        let property_type = property_node.attribute("type").unwrap_or("string");
        if property_type == "class" {
            let members = match property_node.children().find(|node| node.has_tag_name("properties")) {
                Some(members_node) => parse_properties(members_node, tile_id)?,
                None => Properties::default(),
            };
            let value = PropertyValue::Class {
                property_type: String::from(property_node.attribute("propertytype").unwrap_or("")),
                properties: members,
            };
            properties.insert(String::from(name), value);
            continue;
        }
        if !PropertyValue::is_known_type(property_type) {
            return Err(invalid_value(property_node, "type", property_type, tile_id));
        }

        // Multi-line strings are stored as text content instead of a value attribute
        let value = property_node
            .attribute("value")
            .or_else(|| property_node.text())
            .unwrap_or("");
        let value = PropertyValue::parse(property_type, value)
            .ok_or_else(|| invalid_value(property_node, "value", value, tile_id))?;
        properties.insert(String::from(name), value);
    }
    Ok(properties)
}

fn parse_object(object_node: Node, tile_id: Option<u32>) -> Result<TileObject, TsxError> {
    let mut object = TileObject::default();
    for attribute in object_node.attributes() {
        let name = attribute.name();
        let value = attribute.value();
        match name {
            "id" => object.id = parse_value(object_node, name, value, tile_id)?,
            "name" => object.name = String::from(value),
            "type" | "class" => object.class = String::from(value),
            "x" => object.x = parse_value(object_node, name, value, tile_id)?,
            "y" => object.y = parse_value(object_node, name, value, tile_id)?,
            "width" => object.width = parse_value(object_node, name, value, tile_id)?,
            "height" => object.height = parse_value(object_node, name, value, tile_id)?,
            _ => {}
        }
    }
    for child in object_node.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "ellipse" => object.shape = ObjectShape::Ellipse,
            "point" => object.shape = ObjectShape::Point,
            "polygon" => object.shape = ObjectShape::Polygon(parse_points(child, tile_id)?),
            "polyline" => object.shape = ObjectShape::Polyline(parse_points(child, tile_id)?),
            _ => {}
        }
    }
    Ok(object)
}

/// Parses a points list in the form "x0,y0 x1,y1 ...".
fn parse_points(points_node: Node, tile_id: Option<u32>) -> Result<Vec<(f32, f32)>, TsxError> {
    let value = points_node.attribute("points").unwrap_or("");
    value
        .split_whitespace()
        .map(|pair| -> Result<(f32, f32), TsxError> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| invalid_value(points_node, "points", value, tile_id))?;
            let x = parse_value(points_node, "points", x, tile_id)?;
            let y = parse_value(points_node, "points", y, tile_id)?;
            Ok((x, y))
        })
        .collect()
}
