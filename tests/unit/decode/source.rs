use super::*;
use crate::test_support::{Tile, scratch, write_gif, write_solid_gif};

#[test]
fn missing_source_is_rejected_at_construction() {
    let err = AnimatedSource::new("definitely/not/here.gif").unwrap_err();
    assert!(matches!(err, GifbarError::SourceNotFound { .. }));
}

#[test]
fn palette_maps_indices_and_transparency() {
    let palette = [10, 20, 30, 40, 50, 60];
    let out = apply_palette(&[0, 1, 1, 7], &palette, Some(1));
    assert_eq!(
        out,
        vec![10, 20, 30, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    let out = apply_palette(&[1], &palette, None);
    assert_eq!(out, vec![40, 50, 60, 255]);
}

#[test]
fn reader_reports_canvas_frames_and_exhaustion() {
    let root = scratch("reader");
    let path = root.join("a.gif");
    write_solid_gif(&path, 6, 4, 3);

    let source = AnimatedSource::new(&path).unwrap();
    let mut reader = RawFrameReader::open(&source).unwrap();
    assert_eq!(reader.canvas(), Canvas::new(6, 4).unwrap());

    let first = reader.next_frame().unwrap().unwrap();
    assert_eq!((first.width, first.height), (6, 4));
    assert_eq!(&first.rgba[0..4], &[0, 0, 255, 255]);
    assert_eq!(first.delay, FrameDelay(4));

    let second = reader.next_frame().unwrap().unwrap();
    assert_eq!(&second.rgba[0..4], &[0, 255, 0, 255]);

    assert!(reader.next_frame().unwrap().is_some());
    assert!(reader.next_frame().unwrap().is_none());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn reader_exposes_tile_regions() {
    let root = scratch("regions");
    let path = root.join("b.gif");
    write_gif(
        &path,
        8,
        8,
        &[
            Tile::full(8, 8, 0),
            Tile {
                left: 2,
                top: 2,
                width: 3,
                height: 3,
                index: 1,
                transparent: None,
                delay: 2,
            },
        ],
    );

    let source = AnimatedSource::new(&path).unwrap();
    let mut reader = RawFrameReader::open(&source).unwrap();
    assert_eq!(reader.next_region().unwrap(), Some((8, 8)));
    assert_eq!(reader.next_region().unwrap(), Some((3, 3)));
    assert_eq!(reader.next_region().unwrap(), None);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn garbage_input_is_a_decode_error() {
    let root = scratch("garbage");
    let path = root.join("c.gif");
    std::fs::write(&path, b"not a gif at all").unwrap();

    let source = AnimatedSource::new(&path).unwrap();
    let err = RawFrameReader::open(&source).err().unwrap();
    assert!(matches!(err, GifbarError::Decode(_)));

    std::fs::remove_dir_all(&root).ok();
}
