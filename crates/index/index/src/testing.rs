//! Conformance suite shared by every [`MetadataIndex`] backend.

use chrono::{DateTime, TimeZone, Utc};

use shutter_core::Asset;

use crate::error::IndexError;
use crate::index::MetadataIndex;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn record(id: &str, created_at: DateTime<Utc>) -> Asset {
    Asset {
        id: id.to_owned(),
        created_at,
        filename: format!("{id}.jpg"),
        mime: "image/jpeg".to_owned(),
        size: 57,
    }
}

/// Run the full metadata index conformance test suite.
///
/// Call this from your backend's test module with a fresh, empty index.
/// Every test removes the records it creates.
///
/// # Errors
///
/// Returns an error if an index operation fails unexpectedly. Assertion
/// failures panic.
pub async fn run_index_conformance_tests(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    test_get_missing(index).await?;
    test_insert_and_get(index).await?;
    test_insert_duplicate(index).await?;
    test_delete(index).await?;
    test_list_order_and_pagination(index).await?;
    test_list_ties_break_by_id(index).await?;
    test_list_past_end(index).await?;
    Ok(())
}

async fn test_get_missing(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let err = index.get("conformance-missing").await.unwrap_err();
    assert!(err.is_not_found(), "get on missing id should be NotFound");
    Ok(())
}

async fn test_insert_and_get(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let asset = record("conformance-insert", at(1_700_000_000));
    index.insert(&asset).await?;
    let found = index.get(&asset.id).await?;
    assert_eq!(found, asset, "stored record should round-trip unchanged");
    index.delete(&asset.id).await?;
    Ok(())
}

async fn test_insert_duplicate(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let original = record("conformance-dup", at(1_700_000_000));
    index.insert(&original).await?;

    let mut clobber = record("conformance-dup", at(1_700_000_100));
    clobber.filename = "other.png".to_owned();
    let err = index.insert(&clobber).await.unwrap_err();
    assert!(
        matches!(err, IndexError::Conflict(_)),
        "duplicate insert should be Conflict, got {err}"
    );
    assert_eq!(index.get("conformance-dup").await?.filename, original.filename);

    index.delete("conformance-dup").await?;
    Ok(())
}

async fn test_delete(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let asset = record("conformance-delete", at(1_700_000_000));
    index.insert(&asset).await?;

    let removed = index.delete(&asset.id).await?;
    assert_eq!(removed.id, asset.id);
    assert!(index.get(&asset.id).await.unwrap_err().is_not_found());

    let err = index.delete(&asset.id).await.unwrap_err();
    assert!(err.is_not_found(), "second delete should be NotFound");
    Ok(())
}

async fn test_list_order_and_pagination(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let base = index.count().await?;
    // Inserted out of order; listing must not depend on insertion order.
    let ids = ["conformance-p2", "conformance-p0", "conformance-p4", "conformance-p1", "conformance-p3"];
    for id in ids {
        let n: i64 = id[id.len() - 1..].parse().unwrap_or_default();
        index.insert(&record(id, at(4_000_000_000 + n))).await?;
    }

    assert_eq!(index.count().await?, base + 5);

    let first = index.list(2, 0).await?;
    assert_eq!(first.total, base + 5);
    let first_ids: Vec<&str> = first.items.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(first_ids, ["conformance-p4", "conformance-p3"]);

    let second = index.list(2, 2).await?;
    let second_ids: Vec<&str> = second.items.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(second_ids, ["conformance-p2", "conformance-p1"]);

    let third = index.list(2, 4).await?;
    assert_eq!(third.items[0].id, "conformance-p0");

    let mut seen = 0;
    let mut offset = 0;
    loop {
        let page = index.list(3, offset).await?;
        assert!(page.items.len() <= 3);
        if page.items.is_empty() {
            break;
        }
        for pair in page.items.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at, "pages must be newest first");
        }
        seen += page.items.len();
        offset += page.items.len();
    }
    assert_eq!(u64::try_from(seen).unwrap_or(u64::MAX), base + 5);

    let none = index.list(0, 0).await?;
    assert!(none.items.is_empty());
    assert_eq!(none.total, base + 5);

    for id in ids {
        index.delete(id).await?;
    }
    Ok(())
}

async fn test_list_ties_break_by_id(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let same = at(4_100_000_000);
    for id in ["conformance-tie-a", "conformance-tie-c", "conformance-tie-b"] {
        index.insert(&record(id, same)).await?;
    }

    let page = index.list(3, 0).await?;
    let ids: Vec<&str> = page.items.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["conformance-tie-c", "conformance-tie-b", "conformance-tie-a"]);

    for id in ["conformance-tie-a", "conformance-tie-b", "conformance-tie-c"] {
        index.delete(id).await?;
    }
    Ok(())
}

async fn test_list_past_end(index: &dyn MetadataIndex) -> Result<(), IndexError> {
    let asset = record("conformance-past-end", at(1_700_000_000));
    index.insert(&asset).await?;
    let total = index.count().await?;

    let page = index.list(10, usize::try_from(total).unwrap_or(usize::MAX) + 5).await?;
    assert!(page.items.is_empty(), "offset past total should yield no items");
    assert_eq!(page.total, total);

    index.delete(&asset.id).await?;
    Ok(())
}
