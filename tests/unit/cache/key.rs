use super::*;

const JPG: &str = "jpg;q=95;unknown=reject";

#[test]
fn digest_is_pinned() {
    // Changing this value invalidates every cache directory in the wild.
    assert_eq!(
        settings_tag(OutputFormat::Jpeg, 95, UnknownOps::Reject),
        JPG
    );
    assert_eq!(
        CacheKey::derive(JPG, "photo.jpg", "resize=100x100").as_str(),
        "87ede8c2e6b9fecebf230612c443c5734c117a88d595c5d14f8dc01ae903ab31"
    );
}

#[test]
fn digest_is_deterministic_and_lowercase_hex() {
    let a = CacheKey::derive(JPG, "dir/a.png", "blur=2,invert");
    let b = CacheKey::derive(JPG, "dir/a.png", "blur=2,invert");
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert!(
        a.as_str()
            .bytes()
            .all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c))
    );
}

#[test]
fn field_boundaries_are_unambiguous() {
    assert_ne!(
        CacheKey::derive(JPG, "ab", "c"),
        CacheKey::derive(JPG, "a", "bc")
    );
    assert_ne!(
        CacheKey::derive(JPG, "", "abc"),
        CacheKey::derive(JPG, "abc", "")
    );
    assert_ne!(
        CacheKey::derive("png", "a", "b"),
        CacheKey::derive("", "pnga", "b")
    );
}

#[test]
fn chain_text_is_hashed_verbatim() {
    assert_ne!(
        CacheKey::derive(JPG, "a.jpg", "invert,blur=1"),
        CacheKey::derive(JPG, "a.jpg", "blur=1,invert")
    );
    assert_ne!(
        CacheKey::derive(JPG, "a.jpg", "blur=1"),
        CacheKey::derive(JPG, "a.jpg", "blur=1.0")
    );
}

#[test]
fn output_affecting_settings_separate_keys() {
    let tags = [
        settings_tag(OutputFormat::Jpeg, 95, UnknownOps::Reject),
        settings_tag(OutputFormat::Jpeg, 80, UnknownOps::Reject),
        settings_tag(OutputFormat::Jpeg, 95, UnknownOps::Skip),
        settings_tag(OutputFormat::Png, 95, UnknownOps::Reject),
        settings_tag(OutputFormat::Png, 95, UnknownOps::Skip),
    ];
    for (i, a) in tags.iter().enumerate() {
        for b in &tags[i + 1..] {
            assert_ne!(
                CacheKey::derive(a, "a.png", "sepia,grayscale"),
                CacheKey::derive(b, "a.png", "sepia,grayscale"),
                "{a} vs {b}"
            );
        }
    }
    // Quality does not affect PNG output.
    assert_eq!(
        settings_tag(OutputFormat::Png, 10, UnknownOps::Reject),
        settings_tag(OutputFormat::Png, 95, UnknownOps::Reject)
    );
}

#[test]
fn file_name_uses_format_extension() {
    let k = CacheKey::derive(JPG, "a", "b");
    assert_eq!(k.file_name(OutputFormat::Jpeg), format!("{k}.jpg"));
    assert_eq!(k.file_name(OutputFormat::Png), format!("{k}.png"));
}
