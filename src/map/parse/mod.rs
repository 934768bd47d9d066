//! Structs defined here mirror those in [`crate::map`].
//! The main difference is that they're mostly a 1:1 mapping of the tsx spec,
//! keep source line numbers, and have not been validated yet.
mod tileset;

pub use tileset::*;

use std::str::FromStr;
use roxmltree::Node;
use crate::map::{Location, TsxError};

/// 1-based line of the node's start tag.
pub(crate) fn line_of(node: Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

/// Parses an attribute value, reporting the element and attribute on failure.
pub(crate) fn parse_value<T: FromStr>(
    node: Node,
    attribute: &str,
    value: &str,
    tile_id: Option<u32>,
) -> Result<T, TsxError> {
    value.trim().parse().map_err(|_| invalid_value(node, attribute, value, tile_id))
}

pub(crate) fn invalid_value(node: Node, attribute: &str, value: &str, tile_id: Option<u32>) -> TsxError {
    TsxError::InvalidAttributeValue {
        element: String::from(node.tag_name().name()),
        attribute: String::from(attribute),
        value: String::from(value),
        at: Location::new(tile_id, line_of(node)),
    }
}
