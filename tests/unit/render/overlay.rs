use super::*;

#[test]
fn layout_uses_rendered_box_not_logical_size() {
    // A 1080x1920 canvas shown at 270x480 CSS pixels.
    let rendered = ScreenBox {
        x: 100.0,
        y: 20.0,
        width: 270.0,
        height: 480.0,
    };
    let layout = VideoOverlayLayout::for_canvas(rendered, OverlayStacking::default());
    assert_eq!(layout.width_px, 270.0);
    assert_eq!(layout.height_px, 480.0);
    assert_eq!(layout.center_x, 235.0);
    assert_eq!(layout.center_y, 260.0);
    assert_eq!(layout.stacking, OverlayStacking::VideoBehindCanvas);
}

#[test]
fn css_stretches_and_layers_the_video() {
    let layout = VideoOverlayLayout::for_canvas(
        ScreenBox {
            x: 0.0,
            y: 0.0,
            width: 300.0,
            height: 150.5,
        },
        OverlayStacking::VideoAboveCanvas,
    );
    let css = layout.css();
    assert!(css.contains("width: 300px"));
    assert!(css.contains("height: 150.5px"));
    assert!(css.contains("object-fit: fill"));
    assert!(css.contains("z-index: 2"));
}
