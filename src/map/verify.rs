use std::path::Path;
use rayon::prelude::*;
use tracing::instrument;
use crate::{TileDefinition, Tileset, TsxError};

/// What [`verify_assets`] checks beyond the manifest itself.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct VerifyOptions {
    /// Reads each image header and compares its size with the declared one.
    pub check_dimensions: bool,
}

/// Resolves every tile image relative to the manifest directory and checks that it exists.
/// Tiles are checked in parallel. When several tiles fail, the error for the lowest id is returned.
#[instrument(skip_all)]
pub fn verify_assets(
    tileset: &Tileset,
    manifest_dir: impl AsRef<Path>,
    options: VerifyOptions,
) -> Result<(), TsxError> {
    let manifest_dir = manifest_dir.as_ref();
    let tiles: Vec<&TileDefinition> = tileset.iter().collect();
    let first_error = tiles
        .par_iter()
        .filter_map(|tile| verify_tile(tile, manifest_dir, options).err())
        .min_by_key(|err| err.tile_id());
    match first_error {
        Some(err) => Err(err),
        None => {
            log::debug!("Verified {} images of tileset '{}'", tiles.len(), tileset.name);
            Ok(())
        },
    }
}

fn verify_tile(tile: &TileDefinition, manifest_dir: &Path, options: VerifyOptions) -> Result<(), TsxError> {
    let path = tile.resolve_image(manifest_dir);
    if !path.is_file() {
        return Err(TsxError::MissingAsset { id: tile.id, path: path.display().to_string() });
    }
    if !options.check_dimensions {
        return Ok(());
    }
    let (actual_width, actual_height) = image::image_dimensions(&path)
        .map_err(|err| TsxError::UnreadableAsset {
            id: tile.id,
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    if (actual_width, actual_height) != (tile.width, tile.height) {
        return Err(TsxError::DimensionMismatch {
            id: tile.id,
            path: path.display().to_string(),
            declared_width: tile.width,
            declared_height: tile.height,
            actual_width,
            actual_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use image::{ImageFormat, RgbaImage};
    use tempfile::TempDir;
    use crate::map::ErrorKind;
    use crate::{Tileset, TsxError};
    use super::{verify_assets, VerifyOptions};

    const MANIFEST: &str = r#"<tileset name="Props" tilewidth="8" tileheight="6" tilecount="3">
 <tile id="1"><image width="4" height="6" source="chair.png"/></tile>
 <tile id="7"><image width="8" height="2" source="props/knob.png"/></tile>
 <tile id="12"><image width="3" height="3" source="lock.png"/></tile>
</tileset>"#;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        RgbaImage::new(width, height).save_with_format(path, ImageFormat::Png).unwrap();
    }

    #[test]
    fn all_present() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "chair.png", 4, 6);
        write_png(&dir, "props/knob.png", 8, 2);
        write_png(&dir, "lock.png", 3, 3);
        let tileset = Tileset::parse_str(MANIFEST).unwrap();
        verify_assets(&tileset, dir.path(), VerifyOptions { check_dimensions: true }).unwrap();
    }

    #[test]
    fn reports_lowest_missing_id() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "chair.png", 4, 6);
        let tileset = Tileset::parse_str(MANIFEST).unwrap();
        let err = verify_assets(&tileset, dir.path(), VerifyOptions::default()).unwrap_err();
        assert_eq!(ErrorKind::MissingAsset, err.kind());
        assert_eq!(Some(7), err.tile_id());
    }

    #[test]
    fn dimension_mismatch() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "chair.png", 4, 6);
        write_png(&dir, "props/knob.png", 8, 3);
        write_png(&dir, "lock.png", 3, 3);
        let tileset = Tileset::parse_str(MANIFEST).unwrap();

        // Existence alone passes
        verify_assets(&tileset, dir.path(), VerifyOptions::default()).unwrap();

        let err = verify_assets(&tileset, dir.path(), VerifyOptions { check_dimensions: true }).unwrap_err();
        assert!(matches!(err, TsxError::DimensionMismatch { id: 7, actual_height: 3, .. }));
        assert_eq!(ErrorKind::InvalidDimension, err.kind());
    }

    #[test]
    fn unreadable_image() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "chair.png", 4, 6);
        write_png(&dir, "props/knob.png", 8, 2);
        std::fs::write(dir.path().join("lock.png"), b"not a png").unwrap();
        let tileset = Tileset::parse_str(MANIFEST).unwrap();
        let err = verify_assets(&tileset, dir.path(), VerifyOptions { check_dimensions: true }).unwrap_err();
        assert!(matches!(err, TsxError::UnreadableAsset { id: 12, .. }));
    }
}
