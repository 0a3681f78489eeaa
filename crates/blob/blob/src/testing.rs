//! Conformance suite shared by every [`BlobStore`] backend.

use bytes::Bytes;
use futures::TryStreamExt;

use crate::error::BlobError;
use crate::store::BlobStore;

/// Run the full blob store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if a store operation fails unexpectedly. Assertion
/// failures panic.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), BlobError> {
    test_get_missing(store).await?;
    test_put_and_get(store).await?;
    test_put_existing_is_rejected(store).await?;
    test_open_streams_full_content(store).await?;
    test_empty_blob(store).await?;
    test_delete(store).await?;
    test_delete_missing(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn BlobStore) -> Result<(), BlobError> {
    let err = store.get("conformance-missing").await.unwrap_err();
    assert!(err.is_not_found(), "get on missing blob should be NotFound, got {err}");
    assert!(!store.exists("conformance-missing").await?);
    let err = store.open("conformance-missing").await.err();
    assert!(
        matches!(err, Some(BlobError::NotFound(_))),
        "open on missing blob should be NotFound"
    );
    Ok(())
}

async fn test_put_and_get(store: &dyn BlobStore) -> Result<(), BlobError> {
    let data = Bytes::from_static(b"\xff\xd8\xff\xe0 not really a jpeg");
    store.put("conformance-put-get", data.clone()).await?;
    assert!(store.exists("conformance-put-get").await?);
    let read = store.get("conformance-put-get").await?;
    assert_eq!(read, data, "stored bytes should round-trip unchanged");
    Ok(())
}

async fn test_put_existing_is_rejected(store: &dyn BlobStore) -> Result<(), BlobError> {
    store
        .put("conformance-dup", Bytes::from_static(b"original"))
        .await?;
    let err = store
        .put("conformance-dup", Bytes::from_static(b"clobber"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, BlobError::AlreadyExists(_)),
        "second put should be AlreadyExists, got {err}"
    );
    let read = store.get("conformance-dup").await?;
    assert_eq!(read.as_ref(), b"original", "original content should remain");
    Ok(())
}

async fn test_open_streams_full_content(store: &dyn BlobStore) -> Result<(), BlobError> {
    let data: Vec<u8> = b"0123456789abcdef".iter().copied().cycle().take(200_000).collect();
    store.put("conformance-stream", Bytes::from(data.clone())).await?;
    let chunks: Vec<Bytes> = store.open("conformance-stream").await?.try_collect().await?;
    let streamed: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(streamed, data, "streamed content should match stored bytes");
    Ok(())
}

async fn test_empty_blob(store: &dyn BlobStore) -> Result<(), BlobError> {
    store.put("conformance-empty", Bytes::new()).await?;
    let read = store.get("conformance-empty").await?;
    assert!(read.is_empty());
    Ok(())
}

async fn test_delete(store: &dyn BlobStore) -> Result<(), BlobError> {
    store
        .put("conformance-delete", Bytes::from_static(b"bye"))
        .await?;
    store.delete("conformance-delete").await?;
    assert!(!store.exists("conformance-delete").await?);
    let err = store.get("conformance-delete").await.unwrap_err();
    assert!(err.is_not_found(), "get after delete should be NotFound");

    // The id can be reused once the blob is gone.
    store
        .put("conformance-delete", Bytes::from_static(b"again"))
        .await?;
    store.delete("conformance-delete").await?;
    Ok(())
}

async fn test_delete_missing(store: &dyn BlobStore) -> Result<(), BlobError> {
    let err = store.delete("conformance-never").await.unwrap_err();
    assert!(err.is_not_found(), "delete on missing blob should be NotFound");
    Ok(())
}
