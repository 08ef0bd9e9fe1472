use super::*;
use crate::animation::tracks::AuxProperty;
use crate::timeline::geometry::ScrollDistance;

const SECTION: &str = r#"{
  "frames": { "template": "frames/frame_{:04}.jpg", "count": 192 },
  "canvas": { "width": 1920, "height": 1080 },
  "pin": { "trigger_top": 800, "anchor": 0.0, "distance": { "viewport": 3 } },
  "scrub": 0.5,
  "missing_frame": { "placeholder": [0, 0, 0, 255] },
  "preload": { "threads": 4 },
  "tracks": [
    { "target": "headline", "property": "opacity", "from": 0, "to": 1, "window": [0, 0.2] }
  ]
}"#;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "scrubreel_{name}_{}_{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn full_section_parses() {
    let cfg = SectionConfig::from_json_str(SECTION).unwrap();
    cfg.validate().unwrap();

    assert_eq!(cfg.frames.first_number, 1);
    assert_eq!(cfg.frame_count().unwrap().get(), 192);
    assert_eq!(
        cfg.template().unwrap().path_for(crate::FrameIndex(0)),
        "frames/frame_0001.jpg"
    );
    assert_eq!(cfg.pin.distance, ScrollDistance::Viewport(3.0));
    assert_eq!(cfg.missing_frame, MissingFrame::Placeholder([0, 0, 0, 255]));
    assert_eq!(cfg.preload_opts().threads, Some(4));
    assert_eq!(cfg.scrub().unwrap().lag_secs(), 0.5);
    assert_eq!(cfg.tracks[0].property, AuxProperty::Opacity);
    assert!(!cfg.aux_timeline().unwrap().is_empty());

    let opts = cfg
        .controller_opts(Viewport::new(1440.0, 900.0).unwrap())
        .unwrap();
    let range = opts.geometry.resolve(opts.viewport).unwrap();
    assert_eq!(range.start, 800.0);
    assert_eq!(range.end, 3500.0);
}

#[test]
fn minimal_section_uses_defaults() {
    let cfg = SectionConfig::from_json_str(
        r#"{
          "frames": { "template": "f{}.png", "count": 4 },
          "canvas": { "width": 4, "height": 4 },
          "pin": { "trigger_top": 0, "distance": { "pixels": 300 } }
        }"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.scrub, 0.0);
    assert!(cfg.scrub().unwrap().is_immediate());
    assert_eq!(cfg.missing_frame, MissingFrame::Retain);
    assert_eq!(cfg.preload.threads, None);
    assert!(cfg.tracks.is_empty());
}

#[test]
fn parse_errors_are_serde_errors() {
    let err = SectionConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ScrubError::Serde(_)));
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn validation_catches_bad_fields() {
    let base = SectionConfig::from_json_str(SECTION).unwrap();

    let mut c = base.clone();
    c.frames.count = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.frames.template = "frames/no_placeholder.jpg".into();
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.canvas.width = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.pin.anchor = -0.1;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.scrub = f64::INFINITY;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.preload.threads = Some(0);
    assert!(c.validate().is_err());

    let mut c = base;
    c.tracks[0].window = [0.5, 0.1];
    assert!(c.validate().is_err());
}

#[test]
fn from_path_reads_and_validates() {
    let p = temp_path("section_ok");
    std::fs::write(&p, SECTION).unwrap();
    let cfg = SectionConfig::from_path(&p).unwrap();
    assert_eq!(cfg.frames.count, 192);
    std::fs::remove_file(&p).ok();

    let p = temp_path("section_bad");
    std::fs::write(&p, SECTION.replace("192", "0")).unwrap();
    assert!(SectionConfig::from_path(&p).is_err());
    std::fs::remove_file(&p).ok();

    let missing = temp_path("section_missing");
    let err = SectionConfig::from_path(&missing).unwrap_err();
    assert!(matches!(err, ScrubError::Validation(_)));
}
