use super::*;

#[test]
fn padded_template_is_one_based_by_default() {
    let t = FramePathTemplate::parse("frames/frame_{:04}.jpg", 1).unwrap();
    assert_eq!(t.path_for(FrameIndex(0)), "frames/frame_0001.jpg");
    assert_eq!(t.path_for(FrameIndex(191)), "frames/frame_0192.jpg");
}

#[test]
fn bare_placeholder_and_custom_start() {
    let t = FramePathTemplate::parse("seq/{}.webp", 0).unwrap();
    assert_eq!(t.path_for(FrameIndex(0)), "seq/0.webp");
    assert_eq!(t.path_for(FrameIndex(12)), "seq/12.webp");
    assert_eq!(t.number_for(FrameIndex(12)), 12);
}

#[test]
fn paths_cover_the_whole_sequence_in_order() {
    let t = FramePathTemplate::parse("./a/f{:03}.png", 1).unwrap();
    let paths = t.paths(FrameCount::new(3).unwrap());
    assert_eq!(paths, vec!["a/f001.png", "a/f002.png", "a/f003.png"]);
}

#[test]
fn malformed_templates_are_rejected() {
    assert!(FramePathTemplate::parse("frame.png", 1).is_err());
    assert!(FramePathTemplate::parse("frame_{:4}.png", 1).is_err());
    assert!(FramePathTemplate::parse("frame_{:0}.png", 1).is_err());
    assert!(FramePathTemplate::parse("frame_{}_{}.png", 1).is_err());
    assert!(FramePathTemplate::parse("frame_{.png", 1).is_err());
    assert!(FramePathTemplate::parse("../frame_{}.png", 1).is_err());
    assert!(FramePathTemplate::parse("/abs/frame_{}.png", 1).is_err());
}

#[test]
fn normalize_path_cross_platform() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}
