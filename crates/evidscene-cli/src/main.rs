//! evidscene CLI: fuse recorded detector outputs, annotate the image and
//! project the evidence into a 3D scene.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use evidscene::{
    aframe, load_image, Analyzer, ClassTable, DepthImageBackend, DetectorAdapter, DetectorSet,
    EvidenceSource, ModelSlot, PipelineConfig, ReplayBackend, WallFrame, WallGeometry,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

// Backends are loaded at most once per process.
static STANDARD_MODEL: ModelSlot<ReplayBackend> = ModelSlot::new();
static SPECIALIZED_MODEL: ModelSlot<ReplayBackend> = ModelSlot::new();
static DEPTH_MODEL: ModelSlot<DepthImageBackend> = ModelSlot::new();

#[derive(Parser)]
#[command(name = "evidscene")]
#[command(about = "Fuse multi-detector evidence and project it onto a depth-displaced 3D wall")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one image using recorded detector and depth outputs.
    Analyze(CliAnalyzeArgs),

    /// Print the built-in class tables.
    Classes,

    /// Print the wall geometry derived for an image size.
    WallInfo {
        /// Wall width in world units.
        #[arg(long, default_value = "12.0")]
        width: f64,

        #[arg(long)]
        image_width: u32,

        #[arg(long)]
        image_height: u32,
    },
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Recorded detections (JSON) from the general-purpose model.
    #[arg(long)]
    standard: PathBuf,

    /// Recorded detections (JSON) from the specialized forensic model.
    #[arg(long)]
    specialized: Option<PathBuf>,

    /// Grayscale depth image produced by the depth model.
    #[arg(long)]
    depth: PathBuf,

    /// Directory for all output artifacts.
    #[arg(long)]
    out_dir: PathBuf,

    /// Pipeline config (JSON). Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Draw and project detections strictly above this confidence.
    #[arg(long)]
    visual_cutoff: Option<f32>,

    /// Wall width in world units.
    #[arg(long)]
    wall_width: Option<f64>,

    /// TrueType font for raster labels; defaults to the bundled DejaVu Sans Mono.
    #[arg(long)]
    font: Option<PathBuf>,
}

impl CliAnalyzeArgs {
    fn to_config(&self) -> CliResult<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(cutoff) = self.visual_cutoff {
            config.policy.visual_cutoff = cutoff;
        }
        if let Some(width) = self.wall_width {
            config.wall.width = width;
        }
        if let Some(font) = &self.font {
            config.render.font_path = Some(font.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Classes => run_classes(),
        Commands::WallInfo {
            width,
            image_width,
            image_height,
        } => run_wall_info(width, image_width, image_height),
    }
}

// ── classes ────────────────────────────────────────────────────────────

fn run_classes() -> CliResult<()> {
    for (name, table) in [
        ("standard (COCO evidence subset)", ClassTable::coco_evidence()),
        ("specialized (forensic)", ClassTable::forensic()),
    ] {
        println!("{name}: {} classes", table.len());
        for (id, label) in table.iter() {
            println!("  {id:>3}  {label}");
        }
    }
    Ok(())
}

// ── wall-info ──────────────────────────────────────────────────────────

fn run_wall_info(width: f64, image_width: u32, image_height: u32) -> CliResult<()> {
    let geometry = WallGeometry {
        width,
        ..WallGeometry::default()
    };
    let frame = WallFrame::new(&geometry, image_width, image_height)?;
    let c = frame.center();

    println!("evidscene wall geometry for {image_width}x{image_height}");
    println!("  center:        ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
    println!("  size:          {:.3} x {:.3}", frame.width(), frame.height());
    println!("  displacement:  {:.2}", geometry.displacement_scale);
    println!("  segments:      {}", geometry.segments);
    let [vx, vy, vz] = geometry.viewer_position;
    println!("  viewer:        ({vx:.2}, {vy:.2}, {vz:.2})");
    Ok(())
}

// ── analyze ────────────────────────────────────────────────────────────

fn load_detector(
    slot: &'static ModelSlot<ReplayBackend>,
    name: &str,
    path: &Path,
    source: EvidenceSource,
    classes: ClassTable,
) -> evidscene::Result<DetectorAdapter> {
    let backend = slot.get_or_load(|| ReplayBackend::from_json_file(name, path).map(Arc::new))?;
    Ok(DetectorAdapter::new(source, backend, classes))
}

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let config = args.to_config()?;

    tracing::info!("Loading image: {}", args.image.display());
    let img = load_image(&args.image)?;
    let (w, h) = img.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let primary = load_detector(
        &STANDARD_MODEL,
        "standard",
        &args.standard,
        EvidenceSource::Standard,
        ClassTable::coco_evidence(),
    );
    let specialized = args.specialized.as_deref().map(|path| {
        load_detector(
            &SPECIALIZED_MODEL,
            "specialized",
            path,
            EvidenceSource::Specialized,
            ClassTable::forensic(),
        )
    });
    let detectors = DetectorSet::assemble(primary, specialized)?;
    let depth = DEPTH_MODEL.get_or_load(|| DepthImageBackend::open(&args.depth).map(Arc::new))?;

    let analyzer = Analyzer::new(config, detectors, depth)?;
    let analysis = analyzer.analyze(&img)?;

    let summary = analysis.report.summary();
    tracing::info!(
        "Evidence: {} visualized ({} weapons, {} persons), mean confidence {}",
        summary.total,
        summary.weapons,
        summary.persons,
        summary
            .mean_confidence
            .map_or_else(|| "n/a".to_string(), |c| format!("{:.1}%", c * 100.0)),
    );

    std::fs::create_dir_all(&args.out_dir)?;
    let out = |name: &str| args.out_dir.join(name);

    std::fs::write(out("ledger.json"), analysis.ledger.to_json()?)?;
    std::fs::write(out("report.json"), analysis.report.to_json()?)?;
    analysis
        .annotated
        .save(out("annotated.png"))
        .map_err(|e| -> CliError { format!("Failed to write annotated image: {}", e).into() })?;
    std::fs::write(out("scene.json"), analysis.scene.to_json()?)?;
    std::fs::write(out("scene.html"), aframe::to_html(&analysis.scene))?;

    tracing::info!("Results written to {}", args.out_dir.display());
    Ok(())
}
