use std::cell::Cell;

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
fn open_creates_directory() {
    let dir = temp_dir("store_open").join("nested");
    let store = CacheStore::open(&dir, OutputFormat::Png).unwrap();
    assert!(dir.is_dir());
    assert_eq!(store.dir(), dir.as_path());
    std::fs::remove_dir_all(dir.parent().unwrap()).ok();
}

#[test]
fn miss_then_hit_computes_once() {
    let dir = temp_dir("store_hit");
    let store = CacheStore::open(&dir, OutputFormat::Jpeg).unwrap();
    let calls = Cell::new(0);
    let compute = || {
        calls.set(calls.get() + 1);
        Ok(vec![1u8, 2, 3])
    };

    let first = store.lookup_or_compute("a.jpg", "invert", compute).unwrap();
    assert_eq!(first.status, CacheStatus::Miss);
    assert_eq!(std::fs::read(&first.path).unwrap(), vec![1, 2, 3]);
    assert_eq!(
        first.path,
        dir.join(format!("{}.jpg", store.key_for("a.jpg", "invert")))
    );

    let second = store
        .lookup_or_compute("a.jpg", "invert", || {
            calls.set(calls.get() + 1);
            Ok(vec![9u8])
        })
        .unwrap();
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(second.path, first.path);
    assert_eq!(calls.get(), 1);
    assert_eq!(std::fs::read(&second.path).unwrap(), vec![1, 2, 3]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn compute_error_propagates_and_stores_nothing() {
    let dir = temp_dir("store_err");
    let store = CacheStore::open(&dir, OutputFormat::Jpeg).unwrap();
    let err = store
        .lookup_or_compute("a.jpg", "blur=x", || {
            Err(ChainError::transform("blur", "boom"))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransformError);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn successful_store_leaves_no_temp_files() {
    let dir = temp_dir("store_tmp");
    let store = CacheStore::open(&dir, OutputFormat::Png).unwrap();
    store
        .lookup_or_compute("x.png", "invert", || Ok(vec![0u8; 4096]))
        .unwrap();
    let names: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".png"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_cache_dir_surfaces_cache_write_error() {
    let dir = temp_dir("store_gone");
    let store = CacheStore::open(&dir, OutputFormat::Png).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    let err = store
        .lookup_or_compute("x.png", "invert", || Ok(vec![1u8]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CacheWriteError);
}

#[test]
fn status_labels() {
    assert_eq!(CacheStatus::Hit.as_str(), "HIT");
    assert_eq!(CacheStatus::Miss.as_str(), "MISS");
}

#[test]
fn settings_tag_partitions_entries() {
    let dir = temp_dir("store_settings");
    let strict = CacheStore::open(&dir, OutputFormat::Jpeg).unwrap();
    let lenient = CacheStore::open(&dir, OutputFormat::Jpeg)
        .unwrap()
        .with_settings(settings_tag(OutputFormat::Jpeg, 95, UnknownOps::Skip));
    assert_eq!(
        strict.key_for("a.jpg", "sepia"),
        CacheKey::derive(strict.settings(), "a.jpg", "sepia")
    );

    lenient
        .lookup_or_compute("a.jpg", "sepia", || Ok(vec![1u8]))
        .unwrap();
    let err = strict
        .lookup_or_compute("a.jpg", "sepia", || {
            Err(ChainError::unknown_operation("sepia"))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    std::fs::remove_dir_all(&dir).ok();
}
