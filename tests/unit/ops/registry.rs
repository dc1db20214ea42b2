use super::*;

#[test]
fn builtin_has_all_thirteen_ops_with_shapes() {
    let reg = Registry::builtin();
    let expected = [
        ("blur", ParamShape::Float),
        ("sharpen", ParamShape::Float),
        ("gamma", ParamShape::Float),
        ("contrast", ParamShape::Float),
        ("brightness", ParamShape::Float),
        ("saturation", ParamShape::Float),
        ("hue", ParamShape::Float),
        ("resize", ParamShape::Dimensions),
        ("fit", ParamShape::Dimensions),
        ("fill", ParamShape::DimensionsAnchor),
        ("crop", ParamShape::DimensionsAnchor),
        ("grayscale", ParamShape::None),
        ("invert", ParamShape::None),
    ];
    assert_eq!(reg.names().count(), expected.len());
    for (name, shape) in expected {
        let spec = reg.get(name).unwrap_or_else(|| panic!("missing {name}"));
        assert_eq!(spec.shape, shape, "{name}");
    }
}

#[test]
fn lookup_is_exact_and_case_sensitive() {
    let reg = Registry::builtin();
    assert!(reg.get("Blur").is_none());
    assert!(reg.get("blur ").is_none());
    assert!(reg.get("").is_none());
}

#[test]
fn builders_produce_typed_transforms() {
    let reg = Registry::builtin();
    assert_eq!(
        reg.get("blur").unwrap().build("2.5").unwrap(),
        Transform::Blur(2.5)
    );
    assert_eq!(
        reg.get("resize").unwrap().build("0x100").unwrap(),
        Transform::Resize(Dimensions::new(0, 100))
    );
    assert_eq!(
        reg.get("fill").unwrap().build("200x200@center").unwrap(),
        Transform::Fill(Dimensions::new(200, 200), Anchor::Center)
    );
    assert_eq!(
        reg.get("invert").unwrap().build("").unwrap(),
        Transform::Invert
    );
}

#[test]
fn builders_report_specific_param_errors() {
    let reg = Registry::builtin();
    assert!(matches!(
        reg.get("resize").unwrap().build("abc"),
        Err(ParamError::InvalidDimensions(_))
    ));
    assert!(matches!(
        reg.get("crop").unwrap().build("100x100"),
        Err(ParamError::InvalidCropSpec(_))
    ));
    assert!(matches!(
        reg.get("blur").unwrap().build("xyz"),
        Err(ParamError::InvalidParameter(_))
    ));
    assert!(matches!(
        reg.get("fill").unwrap().build("100x100@nowhere"),
        Err(ParamError::InvalidAnchor(_))
    ));
    assert!(matches!(
        reg.get("grayscale").unwrap().build("1"),
        Err(ParamError::InvalidParameter(_))
    ));
}

#[test]
fn custom_table_extends_without_executor_changes() {
    static OPS: &[OpSpec] = &[OpSpec {
        name: "negate",
        shape: ParamShape::None,
        build: |_| Ok(Transform::Invert),
    }];
    let reg = Registry::new(OPS);
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["negate"]);
    assert!(reg.get("invert").is_none());
    assert_eq!(reg.get("negate").unwrap().build("").unwrap(), Transform::Invert);
}

#[test]
fn apply_does_not_mutate_input() {
    let img = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4]));
    let before = img.clone();
    let out = Transform::Invert.apply(&img).unwrap();
    assert_eq!(img, before);
    assert_ne!(out, img);
}
