use super::*;

#[test]
fn hex_triplet_maps_to_bgra_with_full_alpha() {
    let c = parse_hex("#0000aa").unwrap();
    assert_eq!(c.to_bytes(), [0xaa, 0, 0, 255]);

    let c = parse_hex("#AaBb01").unwrap();
    assert_eq!(c.to_bytes(), [0x01, 0xbb, 0xaa, 255]);
}

#[test]
fn rejects_malformed_strings() {
    assert!(parse_hex("ffffff").is_err());
    assert!(parse_hex("#fff").is_err());
    assert!(parse_hex("#ggffff").is_err());
    assert!(parse_hex("#ffffff00").is_err());
    assert!(parse_hex("#ffé0f").is_err());
}

#[test]
fn sign_prefixed_bytes_are_rejected() {
    assert!(parse_hex("#+f+f+f").is_err());
    assert!(parse_hex("#+fffff").is_err());
    assert!(parse_hex("#ff-fff").is_err());
}

#[test]
fn field_name_is_carried_into_error() {
    let err = parse_color_field("render.bg_color", "red").unwrap_err();
    assert_eq!(err.config_field(), Some("render.bg_color"));

    assert_eq!(
        parse_optional_color_field("channels[0].line_color", None).unwrap(),
        None
    );
}
