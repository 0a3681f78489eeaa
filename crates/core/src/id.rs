use uuid::Uuid;

/// Longest identifier accepted by [`is_valid_id`].
pub const MAX_ID_LEN: usize = 128;

/// Source of fresh asset identifiers.
///
/// An allocator must never hand out an identifier that belongs to a live
/// asset. Stores treat a collision as an invariant violation.
pub trait IdAllocator: Send + Sync {
    /// Produce a new identifier.
    fn allocate(&self) -> String;
}

/// Allocates UUIDv7 identifiers.
///
/// A v7 UUID carries a 48-bit millisecond timestamp followed by 74 random
/// bits, so ids sort roughly by creation time and collisions are negligible.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn allocate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Whether `id` is safe to use as a storage key.
///
/// Accepts 1..=[`MAX_ID_LEN`] characters drawn from ASCII alphanumerics,
/// `-` and `_`. Anything else (path separators, dots, whitespace) is rejected.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn uuid_allocator_yields_valid_ids() {
        let id = UuidAllocator.allocate();
        assert_eq!(id.len(), 36);
        assert!(is_valid_id(&id));
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 7);
    }

    #[test]
    fn parallel_allocation_never_collides() {
        let seen = Mutex::new(HashSet::new());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let local: Vec<String> = (0..1_000).map(|_| UuidAllocator.allocate()).collect();
                    seen.lock().unwrap().extend(local);
                });
            }
        });
        assert_eq!(seen.lock().unwrap().len(), 8_000);
    }

    #[test]
    fn valid_id_rules() {
        assert!(is_valid_id("non-existent-id-12345"));
        assert!(is_valid_id("abc_DEF-123"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("a.tmp"));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id(&"x".repeat(MAX_ID_LEN + 1)));
    }
}
