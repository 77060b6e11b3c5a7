//! Scenepack CLI
//!
//! Command-line interface for packing and unpacking movie project bundles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenepack_core::{
    extract_audio_times, Directories, DiskAssetStore, DiskCharStore, Packer, Unpacker,
};

const LAYOUT_FILE: &str = "scenepack.json";

#[derive(Parser)]
#[command(name = "scenepack")]
#[command(about = "Movie project bundle packing and unpacking tool")]
#[command(version)]
struct Cli {
    /// Path to the storage layout file (default: ./scenepack.json if present)
    #[arg(short, long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a storage layout in a directory
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Pack a scene document and its assets into a bundle
    Pack {
        /// Scene document (movie.xml)
        movie: PathBuf,

        /// Optional thumbnail to embed as thumbnail.png
        #[arg(short, long)]
        thumbnail: Option<PathBuf>,

        /// Output bundle path
        #[arg(short, long, default_value = "movie.zip")]
        output: PathBuf,
    },

    /// Unpack a bundle into the local asset stores
    Unpack {
        /// Bundle file produced by `pack`
        bundle: PathBuf,

        /// Where to write the recovered scene document
        #[arg(long, default_value = "movie.xml")]
        movie_out: PathBuf,

        /// Where to write the recovered thumbnail, if the bundle has one
        #[arg(long)]
        thumbnail_out: Option<PathBuf>,
    },

    /// Print per-sound timing descriptors for a scene document as JSON
    AudioTimes {
        /// Scene document (movie.xml)
        movie: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scenepack_core=info".parse().unwrap())
                .add_directive("scenepack_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let dirs = load_layout(cli.layout.as_deref())?;

    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::Pack {
            movie,
            thumbnail,
            output,
        } => cmd_pack(&dirs, movie, thumbnail, output),
        Commands::Unpack {
            bundle,
            movie_out,
            thumbnail_out,
        } => cmd_unpack(&dirs, bundle, movie_out, thumbnail_out),
        Commands::AudioTimes { movie } => cmd_audio_times(&dirs, movie),
    }
}

/// Resolve the storage layout: an explicit file, a scenepack.json in the
/// working directory, or built-in defaults.
fn load_layout(explicit: Option<&std::path::Path>) -> Result<Directories> {
    if let Some(path) = explicit {
        return Directories::load(path)
            .with_context(|| format!("failed to load layout from {}", path.display()));
    }
    let local = PathBuf::from(LAYOUT_FILE);
    if local.exists() {
        return Directories::load(&local).context("failed to load ./scenepack.json");
    }
    Ok(Directories::default())
}

/// Create the storage folders and write a layout file describing them
fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let dirs = Directories::under_root(&root);

    std::fs::create_dir_all(&dirs.theme_root).context("Failed to create theme library directory")?;
    std::fs::create_dir_all(&dirs.font_dir).context("Failed to create font directory")?;
    std::fs::create_dir_all(&dirs.asset_dir).context("Failed to create asset store directory")?;
    std::fs::create_dir_all(&dirs.char_dir).context("Failed to create char store directory")?;

    let layout_path = root.join(LAYOUT_FILE);
    let layout_json = serde_json::to_string_pretty(&dirs)?;
    std::fs::write(&layout_path, layout_json).context("Failed to write scenepack.json")?;

    println!("Initialized scenepack storage at {}", root.display());
    println!("\nLayout:");
    println!("  scenepack.json    - Storage layout file");
    println!("  store/            - Static theme library");
    println!("  client/go/font/   - Bundled fonts");
    println!("  assets/           - UGC asset store");
    println!("  chars/            - UGC character store");

    Ok(())
}

fn cmd_pack(
    dirs: &Directories,
    movie: PathBuf,
    thumbnail: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let movie_xml = std::fs::read(&movie)
        .with_context(|| format!("failed to read scene document {}", movie.display()))?;
    let thumbnail_bytes = match &thumbnail {
        Some(path) => Some(
            std::fs::read(path)
                .with_context(|| format!("failed to read thumbnail {}", path.display()))?,
        ),
        None => None,
    };

    let assets = DiskAssetStore::open(&dirs.asset_dir).context("failed to open asset store")?;
    let chars = DiskCharStore::open(&dirs.char_dir).context("failed to open char store")?;

    let bundle = Packer::new(dirs, &assets, &chars)
        .pack(&movie_xml, thumbnail_bytes.as_deref())
        .context("packing failed")?;

    std::fs::write(&output, &bundle)
        .with_context(|| format!("failed to write bundle {}", output.display()))?;

    tracing::info!(bundle = %output.display(), bytes = bundle.len(), "bundle written");
    println!("Packed {} -> {} ({} bytes)", movie.display(), output.display(), bundle.len());
    Ok(())
}

fn cmd_unpack(
    dirs: &Directories,
    bundle: PathBuf,
    movie_out: PathBuf,
    thumbnail_out: Option<PathBuf>,
) -> Result<()> {
    let buffer = std::fs::read(&bundle)
        .with_context(|| format!("failed to read bundle {}", bundle.display()))?;

    let mut assets = DiskAssetStore::open(&dirs.asset_dir).context("failed to open asset store")?;
    let mut chars = DiskCharStore::open(&dirs.char_dir).context("failed to open char store")?;

    let (movie_xml, thumbnail) = Unpacker::new(&mut assets, &mut chars)
        .unpack(&buffer)
        .context("unpacking failed")?;

    if movie_xml.is_empty() {
        println!("Bundle carries no movie.xml; assets imported only.");
    } else {
        std::fs::write(&movie_out, &movie_xml)
            .with_context(|| format!("failed to write {}", movie_out.display()))?;
        println!("Recovered scene document -> {}", movie_out.display());
    }

    if let Some(path) = thumbnail_out {
        if thumbnail.is_empty() {
            println!("Bundle carries no thumbnail.png.");
        } else {
            std::fs::write(&path, &thumbnail)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Recovered thumbnail -> {}", path.display());
        }
    }

    Ok(())
}

fn cmd_audio_times(dirs: &Directories, movie: PathBuf) -> Result<()> {
    let movie_xml = std::fs::read(&movie)
        .with_context(|| format!("failed to read scene document {}", movie.display()))?;
    let timings = extract_audio_times(&movie_xml, dirs).context("audio extraction failed")?;
    println!("{}", serde_json::to_string_pretty(&timings)?);
    Ok(())
}
