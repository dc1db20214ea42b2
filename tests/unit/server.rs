use super::*;
use crate::foundation::error::{ErrorKind, ParamError};

#[test]
fn status_mapping_matches_error_classes() {
    let bad_request = [
        ChainError::param("blur", ParamError::InvalidParameter("x".into())),
        ChainError::EmptyOperation { index: 0 },
        ChainError::unknown_operation("sepia"),
        ChainError::transform("resize", "both axes are zero"),
        ChainError::invalid_source_path("paths must not contain '..'"),
    ];
    for e in &bad_request {
        assert_eq!(status_for(e), StatusCode::BAD_REQUEST, "{e}");
    }
    assert_eq!(
        status_for(&ChainError::source_not_found("a.png")),
        StatusCode::NOT_FOUND
    );
    for e in [
        ChainError::source_decode("a.png: bad"),
        ChainError::cache_write("disk full"),
        ChainError::from(anyhow::anyhow!("boom")),
    ] {
        assert_eq!(status_for(&e), StatusCode::INTERNAL_SERVER_ERROR, "{e}");
    }
}

#[test]
fn thread_pool_honours_thread_count() {
    assert_eq!(build_thread_pool(Some(2)).unwrap().current_num_threads(), 2);
    assert!(build_thread_pool(None).unwrap().current_num_threads() >= 1);
}

#[test]
fn zero_threads_are_refused_by_config_before_the_pool() {
    let config = ServerConfig {
        threads: Some(0),
        ..ServerConfig::default()
    };
    assert!(AppState::from_config(&config).is_err());
}

#[tokio::test]
async fn run_on_pool_returns_worker_result() {
    let pool = build_thread_pool(Some(1)).unwrap();
    assert_eq!(run_on_pool(&pool, || Ok(7u32)).await.unwrap(), 7);
    let err = run_on_pool::<(), _>(&pool, || Err(ChainError::unknown_operation("x")))
        .await
        .unwrap_err();
    assert_eq!(err.operation(), Some("x"));
}

#[tokio::test]
async fn panicking_job_becomes_an_internal_error() {
    let pool = build_thread_pool(Some(1)).unwrap();
    let err = run_on_pool::<(), _>(&pool, || panic!("kernel exploded"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().contains("kernel exploded"), "{err}");

    // The worker survives and keeps serving.
    assert_eq!(run_on_pool(&pool, || Ok(3u8)).await.unwrap(), 3);
}
