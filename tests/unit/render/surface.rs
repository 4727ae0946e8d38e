use super::*;

#[test]
fn new_surface_is_blank() {
    let t = RenderTarget::new(Canvas {
        width: 8,
        height: 4,
    })
    .unwrap();
    assert_eq!(t.data_premul().len(), 8 * 4 * 4);
    assert_eq!(t.covered_pixels(), 0);
    assert_eq!(t.pixel(7, 3), Some(Rgba8Premul::transparent()));
    assert_eq!(t.pixel(8, 0), None);
}

#[test]
fn zero_and_oversized_dimensions_are_rejected() {
    assert!(
        RenderTarget::new(Canvas {
            width: 0,
            height: 4
        })
        .is_err()
    );
    let err = RenderTarget::new(Canvas {
        width: 70_000,
        height: 4,
    })
    .unwrap_err();
    assert!(err.to_string().contains("exceeds u16"));
}

#[test]
fn resize_reallocates_only_on_change() {
    let mut t = RenderTarget::new(Canvas {
        width: 4,
        height: 4,
    })
    .unwrap();
    t.pixmap_mut().data_as_u8_slice_mut()[3] = 255;
    t.resize(Canvas {
        width: 4,
        height: 4,
    })
    .unwrap();
    assert_eq!(t.covered_pixels(), 1);

    t.resize(Canvas {
        width: 6,
        height: 2,
    })
    .unwrap();
    assert_eq!((t.width(), t.height()), (6, 2));
    assert_eq!(t.covered_pixels(), 0);
}

#[test]
fn encode_png_round_trips_dimensions() {
    let mut t = RenderTarget::new(Canvas {
        width: 3,
        height: 2,
    })
    .unwrap();
    t.pixmap_mut()
        .data_as_u8_slice_mut()
        .copy_from_slice(&[102u8, 0, 0, 102].repeat(6));
    let png = t.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (3, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 102]);
}
