use std::fmt;
use crate::{ObjectShape, Properties, PropertyValue, TileDefinition, TileObject, Tileset};

impl Tileset {
    /// Serializes this tileset back into a tsx document.
    pub fn to_tsx(&self) -> String {
        TsxDocument(self).to_string()
    }
}

/// Display adapter writing a [`Tileset`] in the layout Tiled uses.
pub struct TsxDocument<'a>(pub &'a Tileset);

impl fmt::Display for TsxDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tileset = self.0;
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        write!(
            f,
            r#"<tileset version="{}" tiledversion="{}" name="{}""#,
            Escaped(&tileset.version),
            Escaped(&tileset.tiled_version),
            Escaped(&tileset.name),
        )?;
        if !tileset.class.is_empty() {
            write!(f, r#" class="{}""#, Escaped(&tileset.class))?;
        }
        writeln!(
            f,
            r#" tilewidth="{}" tileheight="{}" tilecount="{}" columns="{}">"#,
            tileset.tile_width, tileset.tile_height, tileset.tile_count, tileset.columns,
        )?;
        if let Some(offset) = tileset.tile_offset {
            writeln!(f, r#" <tileoffset x="{}" y="{}"/>"#, offset.x, offset.y)?;
        }
        if let Some(grid) = tileset.grid {
            writeln!(
                f,
                r#" <grid orientation="{}" width="{}" height="{}"/>"#,
                grid.orientation.as_str(), grid.width, grid.height,
            )?;
        }
        write_properties(f, &tileset.properties, " ")?;
        for tile in tileset.iter() {
            write_tile(f, tile)?;
        }
        writeln!(f, "</tileset>")
    }
}

fn write_tile(f: &mut fmt::Formatter<'_>, tile: &TileDefinition) -> fmt::Result {
    write!(f, r#" <tile id="{}""#, tile.id)?;
    if !tile.class.is_empty() {
        write!(f, r#" type="{}""#, Escaped(&tile.class))?;
    }
    writeln!(f, ">")?;
    write_properties(f, &tile.properties, "  ")?;
    writeln!(
        f,
        r#"  <image width="{}" height="{}" source="{}"/>"#,
        tile.width, tile.height, Escaped(&tile.image_path),
    )?;
    if !tile.objects.is_empty() {
        writeln!(f, r#"  <objectgroup draworder="index">"#)?;
        for object in &tile.objects {
            write_object(f, object)?;
        }
        writeln!(f, "  </objectgroup>")?;
    }
    writeln!(f, " </tile>")
}

fn write_object(f: &mut fmt::Formatter<'_>, object: &TileObject) -> fmt::Result {
    write!(f, r#"   <object id="{}""#, object.id)?;
    if !object.name.is_empty() {
        write!(f, r#" name="{}""#, Escaped(&object.name))?;
    }
    if !object.class.is_empty() {
        write!(f, r#" type="{}""#, Escaped(&object.class))?;
    }
    write!(f, r#" x="{}" y="{}""#, object.x, object.y)?;
    if object.width != 0.0 || object.height != 0.0 {
        write!(f, r#" width="{}" height="{}""#, object.width, object.height)?;
    }
    match &object.shape {
        ObjectShape::Rectangle => writeln!(f, "/>"),
        ObjectShape::Ellipse => writeln!(f, "><ellipse/></object>"),
        ObjectShape::Point => writeln!(f, "><point/></object>"),
        ObjectShape::Polygon(points) => {
            write!(f, r#"><polygon points=""#)?;
            write_points(f, points)?;
            writeln!(f, r#""/></object>"#)
        },
        ObjectShape::Polyline(points) => {
            write!(f, r#"><polyline points=""#)?;
            write_points(f, points)?;
            writeln!(f, r#""/></object>"#)
        },
    }
}

fn write_points(f: &mut fmt::Formatter<'_>, points: &[(f32, f32)]) -> fmt::Result {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{x},{y}")?;
    }
    Ok(())
}

/// Writes properties sorted by name, so output is stable.
/// Class properties nest their members one level deeper.
fn write_properties(f: &mut fmt::Formatter<'_>, properties: &Properties, indent: &str) -> fmt::Result {
    if properties.is_empty() {
        return Ok(());
    }
    let mut sorted: Vec<_> = properties.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    writeln!(f, "{indent}<properties>")?;
    for (name, value) in sorted {
        match value {
            PropertyValue::Class { property_type, properties: members } => {
                write!(
                    f,
                    r#"{indent} <property name="{}" type="class" propertytype="{}""#,
                    Escaped(name),
                    Escaped(property_type),
                )?;
                if members.is_empty() {
                    writeln!(f, "/>")?;
                }
                else {
                    writeln!(f, ">")?;
                    write_properties(f, members, &format!("{indent}  "))?;
                    writeln!(f, "{indent} </property>")?;
                }
            },
            _ => writeln!(
                f,
                r#"{indent} <property name="{}" type="{}" value="{}"/>"#,
                Escaped(name),
                value.type_name(),
                Escaped(&value.to_value_string()),
            )?,
        }
    }
    writeln!(f, "{indent}</properties>")
}

/// Escapes text for use inside a double-quoted attribute.
/// Whitespace other than spaces is written as character references, since parsers normalize it.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\n' => f.write_str("&#10;")?,
                '\r' => f.write_str("&#13;")?,
                '\t' => f.write_str("&#9;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Grid, ObjectShape, Orientation, Properties, PropertyValue, TileDefinition, TileObject, TileOffset, Tileset};

    const OBJECTS_TSX: &str = include_str!("../../assets/Objects.tsx");

    #[test]
    fn objects_round_trip() {
        let tileset = Tileset::parse_str(OBJECTS_TSX).unwrap();
        let written = tileset.to_tsx();
        let reparsed = Tileset::parse_str(&written).unwrap();
        assert_eq!(tileset, reparsed);
    }

    #[test]
    fn round_trip_with_extras() {
        let mut tileset = Tileset {
            version: String::from("1.10"),
            tiled_version: String::from("1.10.2"),
            name: String::from("Props & \"Characters\""),
            class: String::from("props"),
            tile_width: 300,
            tile_height: 500,
            tile_count: 9,
            columns: 0,
            grid: Some(Grid { orientation: Orientation::Isometric, width: 2, height: 1 }),
            tile_offset: Some(TileOffset { x: -4, y: 12 }),
            ..Default::default()
        };
        tileset.properties.insert(String::from("layer"), PropertyValue::Int(3));
        let mut character = TileDefinition {
            id: 40,
            image_path: String::from("characters/bus driver.webp"),
            width: 309,
            height: 524,
            class: String::from("npc"),
            ..Default::default()
        };
        character.properties.insert(String::from("dialog"), PropertyValue::String(String::from("Hi <there>\nbye")));
        character.properties.insert(String::from("solid"), PropertyValue::Bool(true));
        let mut door = Properties::default();
        door.insert(String::from("locked"), PropertyValue::Bool(true));
        door.insert(String::from("key"), PropertyValue::Class {
            property_type: String::from("Key"),
            properties: Properties::default(),
        });
        character.properties.insert(String::from("door"), PropertyValue::Class {
            property_type: String::from("Door"),
            properties: door,
        });
        character.objects.push(TileObject {
            id: 1,
            class: String::from("collider"),
            x: 10.5,
            y: 400.0,
            width: 280.0,
            height: 120.25,
            ..Default::default()
        });
        character.objects.push(TileObject {
            id: 2,
            name: String::from("feet"),
            shape: ObjectShape::Polygon(vec![(0.0, 0.0), (12.5, 3.0), (6.0, -2.0)]),
            ..Default::default()
        });
        character.objects.push(TileObject { id: 3, shape: ObjectShape::Point, ..Default::default() });
        tileset.tiles.insert(character.id, character);

        let reparsed = Tileset::parse_str(&tileset.to_tsx()).unwrap();
        assert_eq!(tileset, reparsed);
        assert_eq!(Some(400.0), reparsed.get(40).and_then(|tile| tile.collider()).map(|collider| collider.y));
    }

    #[test]
    fn empty_round_trip() {
        let tileset = Tileset::default();
        let reparsed = Tileset::parse_str(&tileset.to_tsx()).unwrap();
        assert!(reparsed.is_empty());
        assert_eq!(tileset, reparsed);
    }
}
