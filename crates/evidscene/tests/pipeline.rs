use std::path::Path;
use std::sync::Arc;

use evidscene::{
    aframe, decode_image, fuse, load_image, project, render, Analyzer, ClassTable, DepthImageBackend,
    DetectorAdapter, DetectorSet, Error, EvidenceSource, FusionConfig, LabelStackConfig,
    LabelStyle, PipelineConfig, ReplayBackend, SceneDescription, WallGeometry, SCENE_SCHEMA_V1,
};
use image::{GrayImage, Luma, Rgb, RgbImage};

fn write_recording(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

fn write_depth(dir: &Path, w: u32, h: u32) -> std::path::PathBuf {
    let path = dir.join("depth.png");
    GrayImage::from_fn(w, h, |x, _| Luma([(x * 255 / (w - 1)) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn standard_set(dir: &Path, specialized: Option<&str>) -> DetectorSet {
    let std_path = write_recording(
        dir,
        "standard.json",
        r#"[
            {"class_id": 43, "confidence": 0.5, "box": [10, 10, 50, 50]},
            {"class_id": 43, "confidence": 0.4, "box": [12, 12, 50, 50]},
            {"class_id": 2, "confidence": 0.99, "box": [0, 0, 20, 20]},
            {"class_id": 0, "confidence": 0.25, "box": [60, 60, 130, 99]}
        ]"#,
    );
    let primary = ReplayBackend::from_json_file("standard", &std_path).map(|b| {
        DetectorAdapter::new(EvidenceSource::Standard, Arc::new(b), ClassTable::coco_evidence())
    });
    let specialized = specialized.map(|file| {
        ReplayBackend::from_json_file("forensic", &dir.join(file)).map(|b| {
            DetectorAdapter::new(EvidenceSource::Specialized, Arc::new(b), ClassTable::forensic())
        })
    });
    DetectorSet::assemble(primary, specialized).unwrap()
}

#[test]
fn knife_scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let img = RgbImage::from_pixel(100, 100, Rgb([40, 40, 40]));
    let depth = DepthImageBackend::open(&write_depth(dir.path(), 100, 100)).unwrap();
    let analyzer = Analyzer::new(
        PipelineConfig::default(),
        standard_set(dir.path(), None),
        Arc::new(depth),
    )
    .unwrap();

    let a = analyzer.analyze(&img).unwrap();

    // Overlapping knife suppressed by the backend, unmapped class dropped.
    let labels: Vec<&str> = a.ledger.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["Knife", "Person"]);
    assert_eq!(a.ledger.entries()[1].bbox.x2, 100.0);

    assert_eq!(a.report.len(), 2);
    assert!(!a.report.records[1].visualized);

    assert_eq!(a.scene.schema, SCENE_SCHEMA_V1);
    assert_eq!(a.scene.markers.len(), 1);
    let m = &a.scene.markers[0];
    assert_eq!(m.text, "Knife 50%");
    assert_eq!(m.color, "#f97316");
    assert!(m.connector.is_none());
    assert!(m.label_position[1] > m.position[1]);

    // Left border below the flipped label background.
    assert_eq!(a.annotated.get_pixel(10, 45).0, [255, 69, 0]);
}

#[test]
fn missing_specialized_recording_degrades_to_primary() {
    let dir = tempfile::tempdir().unwrap();
    let set = standard_set(dir.path(), Some("does-not-exist.json"));
    assert_eq!(set.len(), 1);
    let ledger = fuse(
        &RgbImage::new(100, 100),
        &set,
        &FusionConfig::default(),
    )
    .unwrap();
    assert!(ledger.iter().all(|d| d.source == EvidenceSource::Standard));
}

#[test]
fn specialized_detections_follow_primary() {
    let dir = tempfile::tempdir().unwrap();
    write_recording(
        dir.path(),
        "forensic.json",
        r#"[{"class_id": 0, "confidence": 0.9, "box": [60, 10, 90, 40]},
            {"class_id": 1, "confidence": 0.35, "box": [5, 70, 25, 95]}]"#,
    );
    let set = standard_set(dir.path(), Some("forensic.json"));
    let img = RgbImage::new(100, 100);
    let ledger = fuse(&img, &set, &FusionConfig::default()).unwrap();
    let labels: Vec<&str> = ledger.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["Knife", "Person", "Gun", "Blood Stain"]);

    let visual: Vec<_> = ledger.visualized(0.30).collect();
    let depth = evidscene::DepthMap::new(1, 1, vec![0.0]).unwrap();
    let scene = project(
        visual.iter().copied(),
        &img,
        &depth,
        &WallGeometry::default(),
        &LabelStackConfig::default(),
    )
    .unwrap();
    assert_eq!(scene.markers.len(), 3);

    let annotated = render(&img, &ledger, 0.30, &LabelStyle::default());
    assert_eq!(annotated.dimensions(), img.dimensions());
}

#[test]
fn scene_survives_json_and_html_export() {
    let dir = tempfile::tempdir().unwrap();
    let img = RgbImage::from_pixel(64, 48, Rgb([200, 10, 10]));
    let depth = DepthImageBackend::open(&write_depth(dir.path(), 64, 48)).unwrap();
    let analyzer = Analyzer::new(
        PipelineConfig::default(),
        standard_set(dir.path(), None),
        Arc::new(depth),
    )
    .unwrap();
    let scene = analyzer.analyze(&img).unwrap().scene;

    let back = SceneDescription::from_json(&scene.to_json().unwrap()).unwrap();
    assert_eq!(back, scene);

    let html = aframe::to_html(&scene);
    assert!(html.contains("data:image/png;base64,"));
    assert_eq!(html.matches("<a-box").count(), scene.markers.len());
}

#[test]
fn image_decoding_fails_before_backends() {
    assert!(matches!(decode_image(&[0u8; 16]), Err(Error::MalformedImage(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG truncated").unwrap();
    assert!(matches!(load_image(&path), Err(Error::MalformedImage(_))));
    assert!(matches!(
        load_image(&dir.path().join("absent.png")),
        Err(Error::Io { .. })
    ));
}
