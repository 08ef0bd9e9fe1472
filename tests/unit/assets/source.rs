use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "scrubreel_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn memory_source_normalizes_keys() {
    let mut src = MemoryFrameSource::new();
    assert!(src.is_empty());
    src.insert("./frames\\f1.png", vec![1, 2, 3]).unwrap();
    assert_eq!(src.len(), 1);
    assert_eq!(src.fetch("frames/f1.png").unwrap(), vec![1, 2, 3]);
    assert!(src.fetch("frames/f2.png").is_err());
    assert!(src.insert("../f.png", vec![]).is_err());
}

#[test]
fn fs_source_reads_relative_files() {
    let tmp = temp_dir("fs_source");
    std::fs::create_dir_all(tmp.join("frames")).unwrap();
    std::fs::write(tmp.join("frames/f1.bin"), [9u8, 8, 7]).unwrap();

    let src = FsFrameSource::new(&tmp);
    assert_eq!(src.root(), tmp.as_path());
    assert_eq!(src.fetch("frames/f1.bin").unwrap(), vec![9, 8, 7]);

    let err = src.fetch("frames/missing.bin").unwrap_err();
    assert!(err.to_string().contains("missing.bin"));
    assert!(src.fetch("../escape.bin").is_err());

    std::fs::remove_dir_all(&tmp).ok();
}

// Serves `routes` over plain HTTP/1.1 on a loopback port; unknown paths get a 404. Returns the base
// url `http://<addr>/site/`.
#[cfg(feature = "http")]
fn serve(routes: Vec<(String, Vec<u8>)>) -> String {
    use std::io::{BufRead, BufReader, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                    break;
                }
            }

            let target = request_line.split_whitespace().nth(1).unwrap_or("");
            let (status, body) = match routes.iter().find(|(p, _)| p == target) {
                Some((_, body)) => ("200 OK", body.clone()),
                None => ("404 Not Found", Vec::new()),
            };
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        }
    });
    format!("http://{addr}/site/")
}

#[cfg(feature = "http")]
#[test]
fn http_source_needs_a_base_url() {
    for base in ["", "/", "///"] {
        let err = HttpFrameSource::new(base).err().unwrap();
        assert!(matches!(err, ScrubError::Validation(_)), "{base:?}");
    }
}

#[cfg(feature = "http")]
#[test]
fn http_source_joins_base_and_path() {
    let src = HttpFrameSource::new("https://cdn.example.com/reel/").unwrap();
    assert_eq!(
        src.url_for("frames/f_0001.png"),
        "https://cdn.example.com/reel/frames/f_0001.png"
    );

    let src = HttpFrameSource::new("https://cdn.example.com/reel").unwrap();
    assert_eq!(src.url_for("f.png"), "https://cdn.example.com/reel/f.png");
}

#[cfg(feature = "http")]
#[test]
fn http_source_fetches_and_reports_status() {
    let base = serve(vec![("/site/frames/f1.png".to_string(), vec![4, 5, 6])]);
    let src = HttpFrameSource::new(base).unwrap();

    assert_eq!(src.fetch("frames/f1.png").unwrap(), vec![4, 5, 6]);
    assert_eq!(src.fetch("./frames\\f1.png").unwrap(), vec![4, 5, 6]);

    let err = src.fetch("frames/f2.png").unwrap_err();
    assert!(matches!(err, ScrubError::Asset(_)));
    let msg = err.to_string();
    assert!(msg.contains("404"), "{msg}");
    assert!(msg.contains("/site/frames/f2.png"), "{msg}");

    let err = src.fetch("../f1.png").unwrap_err();
    assert!(matches!(err, ScrubError::Validation(_)));
}

#[cfg(feature = "http")]
#[test]
fn http_frames_feed_a_section() {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::SectionConfig;
    use crate::foundation::core::Viewport;
    use crate::lifecycle::section::{LifecycleEvent, ScrubSection};

    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([90, 0, 0, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    // Only the first of two frames is served.
    let base = serve(vec![("/site/frames/f1.png".to_string(), png)]);

    let cfg = SectionConfig::from_json_str(
        r#"{
          "frames": { "template": "frames/f{}.png", "count": 2 },
          "canvas": { "width": 4, "height": 4 },
          "pin": { "trigger_top": 0, "distance": { "pixels": 100 } }
        }"#,
    )
    .unwrap();
    let src = Arc::new(HttpFrameSource::new(base).unwrap());
    let viewport = Viewport::new(800.0, 600.0).unwrap();
    let mut section = ScrubSection::mount(&cfg, src, viewport, 0.0).unwrap();

    let events = section.wait_ready(Duration::from_secs(30)).unwrap();
    assert_eq!(
        events,
        vec![LifecycleEvent::Ready {
            loaded: 1,
            failed: 1
        }]
    );
    let px = section.snapshot().unwrap().pixel(0, 0);
    assert_eq!(px, Some([90, 0, 0, 255]));
}
