use super::*;
use crate::ScrubError;

fn solid(v: u8) -> FrameImage {
    FrameImage::from_premul(1, 1, vec![v, v, v, 255]).unwrap()
}

#[test]
fn ready_only_after_every_slot_settles() {
    let mut store = FrameStore::new(FrameCount::new(3).unwrap());
    assert!(!store.is_ready());

    assert!(store.settle(FrameIndex(2), Ok(solid(2))));
    assert!(store.settle(FrameIndex(0), Err(ScrubError::asset("404"))));
    assert!(!store.is_ready());
    assert_eq!(store.settled_count(), 2);

    let store = match store.into_ready() {
        Ok(_) => panic!("store must not freeze while a slot is pending"),
        Err(store) => store,
    };
    let mut store = store;
    assert!(store.settle(FrameIndex(1), Ok(solid(1))));
    assert!(store.is_ready());
    assert_eq!(store.loaded_count(), 2);
}

#[test]
fn first_outcome_wins_and_out_of_range_is_ignored() {
    let mut store = FrameStore::new(FrameCount::new(2).unwrap());
    assert!(store.settle(FrameIndex(0), Ok(solid(10))));
    assert!(!store.settle(FrameIndex(0), Ok(solid(20))));
    assert!(!store.settle(FrameIndex(5), Ok(solid(30))));
    let px = store.get(FrameIndex(0)).unwrap().pixel(0, 0);
    assert_eq!(px, Some([10, 10, 10, 255]));
    assert!(matches!(
        store.slot(FrameIndex(1)),
        Some(FrameSlot::Pending)
    ));
}

#[test]
fn ready_frames_report_failures() {
    let mut store = FrameStore::new(FrameCount::new(3).unwrap());
    store.settle(FrameIndex(0), Ok(solid(0)));
    store.settle(FrameIndex(1), Err(ScrubError::asset("decode")));
    store.settle(FrameIndex(2), Ok(solid(2)));

    let ready = store.into_ready().unwrap();
    assert_eq!(ready.count().get(), 3);
    assert_eq!(ready.loaded_count(), 2);
    assert_eq!(ready.failed(), &[FrameIndex(1)]);
    assert!(!ready.all_failed());
    assert!(ready.get(FrameIndex(1)).is_none());
    assert!(ready.get(FrameIndex(2)).is_some());
    assert!(ready.get(FrameIndex(3)).is_none());
}

#[test]
fn all_failed_is_not_an_error() {
    let mut store = FrameStore::new(FrameCount::new(2).unwrap());
    store.settle(FrameIndex(0), Err(ScrubError::asset("a")));
    store.settle(FrameIndex(1), Err(ScrubError::asset("b")));
    let ready = store.into_ready().unwrap();
    assert!(ready.all_failed());
    assert_eq!(ready.loaded_count(), 0);
}
