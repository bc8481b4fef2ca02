use image::RgbaImage;

use super::*;
use crate::foundation::core::{Canvas, FrameDelay};

#[test]
fn percent_wins_over_explicit_size() {
    let t = ResizeTarget::from_options(Some((10, 10)), Some(0.5)).unwrap();
    assert_eq!(t, ResizeTarget::Percent(0.5));
    assert_eq!(t.bounds(200, 100), (100, 50));
}

#[test]
fn default_target_is_128_square() {
    let t = ResizeTarget::from_options(None, None).unwrap();
    assert_eq!(
        t,
        ResizeTarget::Size {
            width: 128,
            height: 128
        }
    );
}

#[test]
fn invalid_targets_are_rejected() {
    assert!(ResizeTarget::from_options(Some((0, 5)), None).is_err());
    assert!(ResizeTarget::from_options(None, Some(0.0)).is_err());
    assert!(ResizeTarget::from_options(None, Some(-1.0)).is_err());
    assert!(ResizeTarget::from_options(None, Some(f64::NAN)).is_err());
}

#[test]
fn fit_preserves_aspect_and_never_upscales() {
    assert_eq!(fit_within(200, 100, (100, 50)), (100, 50));
    assert_eq!(fit_within(200, 100, (128, 128)), (128, 64));
    assert_eq!(fit_within(100, 400, (128, 128)), (32, 128));
    assert_eq!(fit_within(50, 20, (128, 128)), (50, 20));
    assert_eq!(fit_within(1000, 1, (10, 10)), (10, 1));
}

#[test]
fn handler_halves_every_frame() {
    let mut store = FrameStore::in_memory(Canvas::new(200, 100).unwrap());
    for _ in 0..3 {
        store
            .push(
                RgbaImage::from_pixel(200, 100, image::Rgba([0, 0, 255, 255])),
                FrameDelay(4),
            )
            .unwrap();
    }

    FrameResizer::new(ResizeTarget::Percent(0.5))
        .handle(&mut store)
        .unwrap();

    for i in 0..store.len() {
        let (w, h) = store.dimensions(i).unwrap();
        assert!(w <= 100 && h <= 50);
        assert_eq!(w * 100, h * 200);
    }
    assert_eq!(store.len(), 3);
}

#[test]
fn percent_above_one_leaves_frames_alone() {
    let mut store = FrameStore::in_memory(Canvas::new(20, 10).unwrap());
    store
        .push(RgbaImage::new(20, 10), FrameDelay(4))
        .unwrap();
    FrameResizer::new(ResizeTarget::Percent(2.0))
        .handle(&mut store)
        .unwrap();
    assert_eq!(store.dimensions(0).unwrap(), (20, 10));
}

#[test]
fn filter_override_keeps_target() {
    let resizer = FrameResizer::new(ResizeTarget::Percent(0.5)).with_filter(FilterType::Nearest);
    assert_eq!(resizer.target(), ResizeTarget::Percent(0.5));

    let mut store = FrameStore::in_memory(Canvas::new(4, 2).unwrap());
    store
        .push(
            RgbaImage::from_pixel(4, 2, image::Rgba([9, 8, 7, 255])),
            FrameDelay(4),
        )
        .unwrap();
    resizer.handle(&mut store).unwrap();

    let frame = store.load(0).unwrap();
    assert_eq!(frame.dimensions(), (2, 1));
    assert_eq!(*frame.get_pixel(1, 0), image::Rgba([9, 8, 7, 255]));
}
