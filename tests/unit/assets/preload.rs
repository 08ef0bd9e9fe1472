use std::io::Cursor;
use std::sync::atomic::AtomicUsize;

use super::*;
use crate::assets::source::MemoryFrameSource;
use crate::foundation::error::ScrubError;

fn png(v: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([v, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn collect(preload: &Preload, n: usize) -> Vec<FrameLoaded> {
    let mut out = Vec::new();
    while out.len() < n {
        match preload.next_timeout(Duration::from_secs(10)) {
            Some(msg) => out.push(msg),
            None => break,
        }
    }
    out
}

struct CountingSource {
    inner: MemoryFrameSource,
    fetches: AtomicUsize,
    delay: Duration,
}

impl FrameSource for CountingSource {
    fn fetch(&self, path: &str) -> ScrubResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.fetch(path)
    }
}

#[test]
fn every_frame_settles_exactly_once() {
    let mut src = MemoryFrameSource::new();
    for n in 1..=6u8 {
        src.insert(&format!("f{n}.png"), png(n * 10)).unwrap();
    }
    let template = FramePathTemplate::parse("f{}.png", 1).unwrap();
    let count = FrameCount::new(6).unwrap();

    let preload = Preload::spawn(
        Arc::new(src),
        &template,
        count,
        PreloadOpts { threads: Some(3) },
    )
    .unwrap();
    let mut got = collect(&preload, 6);
    assert_eq!(got.len(), 6);
    got.sort_by_key(|m| m.index.0);

    for (i, msg) in got.iter().enumerate() {
        assert_eq!(msg.index, FrameIndex(i as u32));
        let frame = msg.outcome.as_ref().unwrap();
        assert_eq!(frame.pixel(0, 0), Some([(i as u8 + 1) * 10, 0, 0, 255]));
    }
}

#[test]
fn per_frame_failures_are_delivered_not_fatal() {
    let mut src = MemoryFrameSource::new();
    src.insert("f1.png", png(1)).unwrap();
    src.insert("f2.png", b"corrupt".to_vec()).unwrap();
    let template = FramePathTemplate::parse("f{}.png", 1).unwrap();

    let preload = Preload::spawn(
        Arc::new(src),
        &template,
        FrameCount::new(3).unwrap(),
        PreloadOpts::default(),
    )
    .unwrap();
    let mut got = collect(&preload, 3);
    got.sort_by_key(|m| m.index.0);

    assert_eq!(got.len(), 3);
    assert!(got[0].outcome.is_ok());
    assert!(matches!(
        got[1].outcome,
        Err(ScrubError::Other(_)) | Err(ScrubError::Asset(_))
    ));
    assert!(matches!(got[2].outcome, Err(ScrubError::Asset(_))));
}

#[test]
fn cancel_stops_pending_fetches() {
    let mut inner = MemoryFrameSource::new();
    for n in 1..=64u32 {
        inner.insert(&format!("f{n}.png"), png(1)).unwrap();
    }
    let src = Arc::new(CountingSource {
        inner,
        fetches: AtomicUsize::new(0),
        delay: Duration::from_millis(20),
    });
    let template = FramePathTemplate::parse("f{}.png", 1).unwrap();

    let preload = Preload::spawn(
        Arc::clone(&src) as Arc<dyn FrameSource>,
        &template,
        FrameCount::new(64).unwrap(),
        PreloadOpts { threads: Some(2) },
    )
    .unwrap();
    preload.cancel();
    assert!(preload.is_cancelled());

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while !preload.is_finished() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(preload.is_finished());
    assert!(src.fetches.load(Ordering::SeqCst) < 64);
}

#[test]
fn dropping_the_handle_cancels() {
    let src = Arc::new(CountingSource {
        inner: MemoryFrameSource::new(),
        fetches: AtomicUsize::new(0),
        delay: Duration::from_millis(20),
    });
    let template = FramePathTemplate::parse("f{}.png", 1).unwrap();
    let preload = Preload::spawn(
        Arc::clone(&src) as Arc<dyn FrameSource>,
        &template,
        FrameCount::new(64).unwrap(),
        PreloadOpts { threads: Some(1) },
    )
    .unwrap();
    drop(preload);

    std::thread::sleep(Duration::from_millis(200));
    let after_drop = src.fetches.load(Ordering::SeqCst);
    assert!(after_drop < 64);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(src.fetches.load(Ordering::SeqCst), after_drop);
}
