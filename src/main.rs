//! ringfit CLI: place a catalog ring on a hand photo and export the result.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ringfit::assets::{self, LocalAssets};
use ringfit::capture::ingest::ImageCandidate;
use ringfit::config::TryOnConfig;
use ringfit::detect::RecordedDetector;
use ringfit::domain::{Finger, FitMode, Size};
use ringfit::export::share::{self, Delivery, FileDownload};
use ringfit::session::picker::RingPicker;
use ringfit::session::{DetectionOutcome, TryOnSession};

#[derive(Parser)]
#[command(name = "ringfit")]
#[command(about = "Try a catalog ring on a hand photo and export the composited PNG")]
#[command(version)]
struct Cli {
    /// Hand photo (jpg, jpeg or png).
    #[arg(long)]
    photo: PathBuf,

    /// Hand detector output for the photo (JSON landmarks).
    #[arg(long)]
    landmarks: PathBuf,

    /// Directory the catalog and ring artwork URLs resolve against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Catalog URL, overriding the configured one.
    #[arg(long)]
    catalog: Option<String>,

    /// Ring id from the catalog.
    #[arg(long)]
    ring: String,

    /// Color id (default: the ring's first color).
    #[arg(long)]
    color: Option<String>,

    /// Finger wearing the ring.
    #[arg(long, default_value = "thumb")]
    finger: Finger,

    /// Output folder (default: configured export folder, then Pictures).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Config file (default: platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preview canvas size, e.g. 600x600.
    #[arg(long)]
    canvas: Option<Size>,

    /// How the photo is fitted onto the canvas.
    #[arg(long)]
    fit: Option<FitMode>,

    /// Persist the effective settings as the default config.
    #[arg(long)]
    save_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TryOnConfig::load_from(path)?,
        None => TryOnConfig::load(),
    };
    if let Some(url) = &cli.catalog {
        config.catalog_url = url.clone();
    }
    if let Some(canvas) = cli.canvas {
        config.canvas = canvas;
    }
    if let Some(fit) = cli.fit {
        config.fit_mode = fit;
    }

    if cli.save_config {
        config.save();
    }

    let local = LocalAssets::new(&cli.assets);
    let mut session = TryOnSession::new(config);
    session.load_catalog(&local).await?;
    let preload = assets::preload_overlays(&local, session.preload_urls());

    let candidate = ImageCandidate::from_path(&cli.photo)?;
    let ticket = session.ingest(&candidate)?;
    let detector = RecordedDetector::new(&cli.landmarks);
    let (preloaded, outcome) = tokio::join!(preload, session.detect(&detector, &ticket));
    let cached = session.merge_preloaded(preloaded);
    log::debug!("{} ring overlays preloaded", cached);
    match outcome {
        DetectionOutcome::Applied { anchors } => log::info!("{} fingers can carry a ring", anchors),
        outcome => log::warn!("Exporting without a ring overlay: {:?}", outcome),
    }

    let catalog = session
        .catalog()
        .cloned()
        .context("Ring catalog is not loaded")?;
    let mut picker = RingPicker::new();
    picker.select_ring(&catalog, &cli.ring)?;
    if let Some(color) = &cli.color {
        picker.select_color(&catalog, color)?;
    }
    picker.commit(&mut session)?;
    session.select_finger(cli.finger)?;
    if let Err(e) = session.load_overlay(&local).await {
        log::warn!("{}", e);
    }
    let snapshot = session.snapshot();
    log::info!(
        "{} on {:?}, {} anchors",
        snapshot.ring.as_deref().unwrap_or("no ring"),
        snapshot.active_finger,
        snapshot.anchors.len()
    );

    let artifact = session.export()?;
    let dir = cli
        .out
        .or_else(|| session.config().download_dir())
        .context("No output folder; pass --out")?;
    let caption = share::share_caption(
        &session.config().share_caption,
        session.state().assignment(),
    );
    match share::deliver(&artifact, &caption, None, &FileDownload::new(dir))? {
        Delivery::Downloaded(path) => println!("{}", path.display()),
        Delivery::Shared => println!("{}", artifact.filename),
    }

    if let (Some(base), Some(assignment)) = (
        &session.config().storefront_base_url,
        session.state().assignment(),
    ) {
        println!("{}", share::storefront_url(base, &assignment.ring));
    }
    Ok(())
}
