use cinema_client::storage::{CredentialStore, FileStore, StorageError};
use cinema_client::ClientConfig;
use speculate2::speculate;
use tokio_test::block_on;

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("storage.json");
        let store = FileStore::open(&path);
    }

    describe "get" {
        it "returns None when the file does not exist" {
            assert!(!path.exists());
            assert_eq!(block_on(store.get("token")).expect("get failed"), None);
        }

        it "returns None for an empty file" {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "\n").unwrap();

            assert_eq!(block_on(store.get("token")).expect("get failed"), None);
        }

        it "reads values written by another process" {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, r#"{"token":"abc123","theme":"dark"}"#).unwrap();

            let token = block_on(store.get("token")).expect("get failed");
            assert_eq!(token.as_deref(), Some("abc123"));
        }

        it "reports a corrupt file" {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "{not json").unwrap();

            let err = block_on(store.get("token")).unwrap_err();
            assert!(matches!(err, StorageError::Corrupt(_)));
        }

        it "reports a path that cannot be read" {
            std::fs::create_dir_all(&path).unwrap();

            let err = block_on(store.get("token")).unwrap_err();
            assert!(matches!(err, StorageError::Io(_)));
        }
    }

    describe "set" {
        it "creates the parent directory and persists the value" {
            block_on(store.set("token", "abc123")).expect("set failed");

            assert!(path.exists());
            let reopened = FileStore::open(&path);
            assert_eq!(block_on(reopened.get("token")).unwrap().as_deref(), Some("abc123"));
        }

        it "keeps other keys" {
            block_on(store.set("theme", "dark")).unwrap();
            block_on(store.set("token", "abc123")).unwrap();
            block_on(store.set("token", "rotated")).unwrap();

            assert_eq!(block_on(store.get("theme")).unwrap().as_deref(), Some("dark"));
            assert_eq!(block_on(store.get("token")).unwrap().as_deref(), Some("rotated"));
        }
    }

    describe "remove" {
        it "removes an existing value" {
            block_on(store.set("token", "abc123")).unwrap();

            assert!(block_on(store.remove("token")).unwrap());
            assert_eq!(block_on(store.get("token")).unwrap(), None);
        }

        it "leaves no temp files behind" {
            block_on(store.set("token", "abc123")).unwrap();
            block_on(store.set("token", "rotated")).unwrap();
            block_on(store.remove("token")).unwrap();

            let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
                .unwrap()
                .map(|entry| entry.unwrap().file_name())
                .collect();
            assert_eq!(names, vec![std::ffi::OsString::from("storage.json")]);
        }

        it "reports when nothing was stored" {
            assert!(!block_on(store.remove("token")).unwrap());
            assert!(!path.exists());
        }
    }

    describe "from_config" {
        it "uses the configured store path" {
            let config = ClientConfig::default().with_store_path(&path);
            let configured = FileStore::from_config(&config).expect("from_config failed");
            assert_eq!(configured.path(), path.as_path());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn readers_never_see_a_partial_write() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = FileStore::open(dir.path().join("storage.json"));
    store.set("token", "abc123").await.expect("seed failed");

    let writer = tokio::spawn({
        let store = store.clone();
        async move {
            for i in 0..500 {
                store
                    .set("token", &format!("rotated-{i}"))
                    .await
                    .expect("set failed");
            }
        }
    });

    let (mut missing, mut failed, mut reads) = (0, 0, 0);
    while !writer.is_finished() {
        match store.get("token").await {
            Ok(Some(_)) => {}
            Ok(None) => missing += 1,
            Err(_) => failed += 1,
        }
        reads += 1;
    }
    writer.await.expect("writer panicked");

    assert!(reads > 0);
    assert_eq!((missing, failed), (0, 0));
    assert_eq!(
        store.get("token").await.unwrap().as_deref(),
        Some("rotated-499")
    );
}
