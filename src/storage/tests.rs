//! Tests for the usage stores

#[cfg(test)]
mod tests {
    use super::super::*;

    #[tokio::test]
    async fn test_memory_store_counts_scans() {
        let store = MemoryStore::new();
        assert_eq!(store.scan_count("u1").await.unwrap(), 0);
        assert_eq!(store.record_scan("u1").await.unwrap(), 1);
        assert_eq!(store.record_scan("u1").await.unwrap(), 2);
        assert_eq!(store.record_scan("u2").await.unwrap(), 1);
        assert_eq!(store.scan_count("u1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_pro_membership() {
        let store = MemoryStore::new();
        assert!(!store.is_pro("u1").await.unwrap());

        store.grant_pro("u1").await.unwrap();
        assert!(store.is_pro("u1").await.unwrap());
        assert!(!store.is_pro("u2").await.unwrap());

        // Idempotent.
        store.grant_pro("u1").await.unwrap();
        assert!(store.is_pro("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_increments() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.record_scan("burst").await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.scan_count("burst").await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_sqlite_store_counts_and_membership() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let path = path.to_str().unwrap();

        let store = SqliteStore::connect(path).await.unwrap();
        assert_eq!(store.scan_count("u1").await.unwrap(), 0);
        assert_eq!(store.record_scan("u1").await.unwrap(), 1);
        assert_eq!(store.record_scan("u1").await.unwrap(), 2);
        assert!(!store.is_pro("u1").await.unwrap());

        store.grant_pro("u1").await.unwrap();
        store.grant_pro("u1").await.unwrap();
        assert!(store.is_pro("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::connect(path).await.unwrap();
            store.record_scan("u1").await.unwrap();
            store.grant_pro("u1").await.unwrap();
        }

        let store = SqliteStore::connect(path).await.unwrap();
        assert_eq!(store.scan_count("u1").await.unwrap(), 1);
        assert!(store.is_pro("u1").await.unwrap());
    }
}
