use super::*;
use crate::foundation::error::ErrorKind;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "imgchain_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn normalize_accepts_nested_relative_paths() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
}

#[test]
fn normalize_rejects_escapes() {
    for raw in ["/etc/passwd", "../secret.png", "a/../../b.png", "C:/x.png", "", "./", "a/.."] {
        let err = normalize_rel_path(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSourcePath, "{raw}");
    }
}

#[test]
fn open_missing_file_is_not_found() {
    let root = SourceRoot::new(temp_dir("source_missing"));
    let err = root.open("nope.png").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceNotFound);
}

#[test]
fn open_directory_is_not_found() {
    let dir = temp_dir("source_dir");
    std::fs::create_dir_all(dir.join("sub")).unwrap();
    let err = SourceRoot::new(&dir).open("sub").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn open_garbage_is_decode_error() {
    let dir = temp_dir("source_garbage");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("bad.png"), b"not a png").unwrap();
    let err = SourceRoot::new(&dir).open("bad.png").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceDecode);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn open_decodes_valid_image() {
    let dir = temp_dir("source_ok");
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    image::RgbaImage::from_pixel(5, 4, image::Rgba([1, 2, 3, 255]))
        .save(dir.join("nested/ok.png"))
        .unwrap();
    let img = SourceRoot::new(&dir).open("nested/ok.png").unwrap();
    assert_eq!(img.dimensions(), (5, 4));
    std::fs::remove_dir_all(&dir).ok();
}
