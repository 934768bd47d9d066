use std::path::PathBuf;
use clap::Parser;
use tileset_manifest::{AssetManager, LoaderConfig, Tileset};

/// Loads a Tiled tileset manifest and prints its tiles.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the .tsx manifest, optionally prefixed with a protocol
    manifest: String,

    /// YAML loader config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check that every referenced image exists
    #[arg(long)]
    verify: bool,

    /// Also compare image sizes with the manifest. Implies --verify
    #[arg(long)]
    check_dimensions: bool,

    /// Print the tileset re-serialized as tsx instead of a summary
    #[arg(long)]
    emit: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = init_profiling(None);

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    config.verify_assets |= args.verify || args.check_dimensions;
    config.check_dimensions |= args.check_dimensions;

    let manager = AssetManager::from_config(&config)?;
    let tileset = manager.load::<Tileset>(&args.manifest)?;
    log::info!("Loaded {} tiles from {}", tileset.len(), args.manifest);

    if args.emit {
        print!("{}", tileset.to_tsx());
    }
    else {
        print_summary(&tileset);
    }
    Ok(())
}

fn print_summary(tileset: &Tileset) {
    println!(
        "Tileset '{}' (format {}, Tiled {}): {} tiles, at most {}x{}",
        tileset.name,
        tileset.version,
        tileset.tiled_version,
        tileset.len(),
        tileset.tile_width,
        tileset.tile_height,
    );
    for tile in tileset.iter() {
        let size = format!("{}x{}", tile.width, tile.height);
        let collider = match tile.collider() {
            Some(_) => "  [collider]",
            None => "",
        };
        println!("{:>5}  {:>10}  {}{}", tile.id, size, tile.image_path, collider);
    }
}

/// Records spans as a chrome trace, written to `trace_file` or a timestamped file in the working directory.
/// `log` output stays with env_logger.
#[cfg(feature = "profile")]
fn init_profiling(trace_file: Option<&std::path::Path>) -> tracing_chrome::FlushGuard {
    use tracing_subscriber::prelude::*;
    let mut builder = tracing_chrome::ChromeLayerBuilder::new();
    if let Some(path) = trace_file {
        builder = builder.file(path);
    }
    let (chrome_layer, guard) = builder.build();
    if let Err(err) = tracing_subscriber::registry().with(chrome_layer).try_init() {
        log::warn!("Profiling disabled: {err}");
    }
    guard
}

#[cfg(all(test, feature = "profile"))]
mod test {
    use tileset_manifest::Tileset;

    #[test]
    fn profiling_starts_after_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::TempDir::new().unwrap();
        let trace_file = dir.path().join("trace.json");
        let guard = super::init_profiling(Some(&trace_file));
        let tileset = Tileset::parse_str(include_str!("../assets/Objects.tsx")).unwrap();
        assert_eq!(46, tileset.len());
        drop(guard);
        assert!(trace_file.exists());
    }
}
