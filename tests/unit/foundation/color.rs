use super::*;

#[test]
fn parses_long_and_short_hex() {
    assert_eq!(HexColor::parse("#FF0000").unwrap(), HexColor::rgb(255, 0, 0));
    assert_eq!(HexColor::parse("00ff80").unwrap(), HexColor::rgb(0, 255, 128));
    assert_eq!(HexColor::parse("#0f8").unwrap(), HexColor::rgb(0, 255, 136));
}

#[test]
fn rejects_malformed_hex() {
    assert!(HexColor::parse("#FF00").is_err());
    assert!(HexColor::parse("#GG0000").is_err());
    assert!(HexColor::parse("").is_err());
    assert!(HexColor::parse("#ééé").is_err());
}

#[test]
fn hex_round_trips_through_serde() {
    let c: HexColor = serde_json::from_str("\"#1A2B3C\"").unwrap();
    assert_eq!(c, HexColor::rgb(0x1a, 0x2b, 0x3c));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#1a2b3c\"");
}

#[test]
fn default_style_is_red_at_forty_percent() {
    let s = MaskStyle::default();
    assert_eq!(s.color, HexColor::rgb(255, 0, 0));
    assert_eq!(s.opacity, 0.4);
    assert_eq!(s.fill_rgba8(), [255, 0, 0, 102]);
}

#[test]
fn css_rgba_formats_like_a_canvas_fill_style() {
    let s = MaskStyle::parse("#FF0000", 0.4).unwrap();
    assert_eq!(s.css_rgba(), "rgba(255, 0, 0, 0.4)");
    let opaque = MaskStyle::parse("#000000", 1.0).unwrap();
    assert_eq!(opaque.css_rgba(), "rgba(0, 0, 0, 1)");
}

#[test]
fn opacity_outside_unit_range_is_rejected() {
    assert!(MaskStyle::parse("#FF0000", 1.5).is_err());
    assert!(MaskStyle::parse("#FF0000", -0.1).is_err());
    assert!(MaskStyle::parse("#FF0000", f64::NAN).is_err());
    assert!(MaskStyle::parse("#FF0000", 0.0).is_ok());
}
