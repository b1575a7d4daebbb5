use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use evidscene::{
    aframe, load_image, Analyzer, ClassTable, DepthImageBackend, DetectorAdapter, DetectorSet,
    EvidenceSource, PipelineConfig, ReplayBackend,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <image.png> <detections.json> <depth.png> [scene.html]",
            args[0]
        );
        std::process::exit(2);
    }

    let image = load_image(Path::new(&args[1]))?;
    let backend = ReplayBackend::from_json_file("standard", Path::new(&args[2]))?;
    let depth = DepthImageBackend::open(Path::new(&args[3]))?;

    let detectors = DetectorSet::new().with(DetectorAdapter::new(
        EvidenceSource::Standard,
        Arc::new(backend),
        ClassTable::coco_evidence(),
    ));
    let analyzer = Analyzer::new(PipelineConfig::default(), detectors, Arc::new(depth))?;
    let analysis = analyzer.analyze(&image)?;

    for record in analysis.report.sorted_by_confidence() {
        println!(
            "{:<12} {:>8}  visualized={}",
            record.label, record.confidence_text, record.visualized
        );
    }
    println!("{} markers in scene", analysis.scene.markers.len());

    if let Some(out_path) = args.get(4) {
        std::fs::write(out_path, aframe::to_html(&analysis.scene))?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
