use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rejoin_core::app::WireCodec;
use rejoin_core::impls::{FsBlobStore, InMemoryBlobStore};
use rejoin_core::{Coordinator, RejoinConfig, ReplyStatus, ResponseEnvelope, ResponseGate};

fn coordinator(store: &InMemoryBlobStore, config: RejoinConfig) -> Coordinator {
    Coordinator::new(Arc::new(store.clone()), config)
}

#[tokio::test]
async fn joins_chunks_and_publishes_object_with_meta() {
    let store = InMemoryBlobStore::new();
    store.insert("abc123.0", "foo").await;
    store.insert("abc123.1", "bar").await;

    let body = WireCodec::encode_request("abc123", 2).unwrap();
    let reply = coordinator(&store, RejoinConfig::default())
        .respond(&body)
        .await;

    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(
        reply.envelope,
        ResponseEnvelope::success("3858f62230ac3c915f300c664312c63f")
    );
    assert_eq!(store.get("abc123").await.unwrap().as_ref(), b"foobar");

    let meta: serde_json::Value =
        serde_json::from_slice(&store.get("abc123.meta").await.unwrap()).unwrap();
    assert_eq!(
        meta,
        serde_json::json!({
            "hash": "3858f62230ac3c915f300c664312c63f",
            "size": 6,
            "mime": "application/octet-stream",
        })
    );
}

#[tokio::test]
async fn object_is_written_before_meta() {
    let store = InMemoryBlobStore::new();
    for i in 0..4 {
        store.insert(format!("ord.{i}"), format!("part{i}")).await;
    }

    let body = WireCodec::encode_request("ord", 4).unwrap();
    let reply = coordinator(&store, RejoinConfig::default())
        .respond(&body)
        .await;

    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(store.opened_writes().await, vec!["ord", "ord.meta"]);
    assert_eq!(store.finished_writes().await, vec!["ord", "ord.meta"]);
}

#[tokio::test]
async fn missing_chunk_publishes_nothing() {
    let store = InMemoryBlobStore::new();
    store.insert("x.0", "a").await;
    store.insert("x.2", "c").await;

    let body = WireCodec::encode_request("x", 3).unwrap();
    let reply = coordinator(&store, RejoinConfig::default())
        .respond(&body)
        .await;

    assert_eq!(reply.status, ReplyStatus::ClientError);
    assert_eq!(reply.envelope, ResponseEnvelope::error("Failed to read chunk"));
    assert!(!store.contains("x").await);
    assert!(!store.contains("x.meta").await);
    assert!(store.opened_writes().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_failing_chunk_gives_one_error_under_any_completion_order() {
    let mut rng = rand::thread_rng();

    for run in 0..25 {
        let store = InMemoryBlobStore::new();
        for i in 0..5 {
            let name = format!("p.{i}");
            store.insert(name.clone(), format!("chunk{i}")).await;
            store
                .delay_read(name, Duration::from_millis(rng.gen_range(0..50)))
                .await;
        }
        store.fail_read("p.3").await;

        let limit = if run % 2 == 0 { None } else { Some(2) };
        let config = RejoinConfig::default().with_max_concurrent_fetches(limit);
        let coordinator = coordinator(&store, config);

        let (gate, rx) = ResponseGate::channel();
        let body = WireCodec::encode_request("p", 5).unwrap();
        coordinator.handle(&body, &gate).await;

        assert!(!gate.send(ResponseEnvelope::success("late")));
        assert_eq!(
            rx.await.unwrap(),
            ResponseEnvelope::error("Failed to read chunk")
        );
        assert!(!store.contains("p").await);
        assert!(!store.contains("p.meta").await);
    }
}

#[tokio::test]
async fn malformed_requests_do_no_store_io() {
    let store = InMemoryBlobStore::new();
    store.insert("abc.0", "a").await;
    let coordinator = coordinator(&store, RejoinConfig::default());

    for body in [
        b"\xc1".to_vec(),
        WireCodec::encode_request("abc", 0).unwrap(),
        WireCodec::encode_request("", 1).unwrap(),
        WireCodec::encode_request("abc", 1_000_000).unwrap(),
    ] {
        let reply = coordinator.respond(&body).await;
        assert_eq!(reply.status, ReplyStatus::ClientError);
        assert_eq!(
            reply.envelope,
            ResponseEnvelope::error("Failed to parse request data")
        );
    }
    assert!(store.opened_writes().await.is_empty());
}

#[tokio::test]
async fn rerun_overwrites_with_identical_content() {
    let store = InMemoryBlobStore::new();
    store.insert("again.0", "same").await;
    let coordinator = coordinator(&store, RejoinConfig::default());
    let body = WireCodec::encode_request("again", 1).unwrap();

    let first = coordinator.respond(&body).await;
    let second = coordinator.respond(&body).await;

    assert_eq!(first, second);
    assert_eq!(store.get("again").await.unwrap().as_ref(), b"same");
}

#[tokio::test]
async fn filesystem_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = RejoinConfig::new("uploads").with_data_dir(dir.path());
    let bucket = config.bucket_dir();
    std::fs::create_dir_all(&bucket).unwrap();
    std::fs::write(bucket.join("doc.0"), b"hello ").unwrap();
    std::fs::write(bucket.join("doc.1"), b"world").unwrap();

    let store = FsBlobStore::new(&bucket).await.unwrap();
    let coordinator = Coordinator::new(Arc::new(store), config);
    let body = WireCodec::encode_request("doc", 2).unwrap();
    let reply = coordinator.respond(&body).await;

    assert_eq!(
        reply.envelope,
        ResponseEnvelope::success("5eb63bbbe01eeed093cb22bb8f5acdc3")
    );
    assert_eq!(std::fs::read(bucket.join("doc")).unwrap(), b"hello world");
    let meta = std::fs::read_to_string(bucket.join("doc.meta")).unwrap();
    assert_eq!(
        meta,
        r#"{"hash":"5eb63bbbe01eeed093cb22bb8f5acdc3","size":11,"mime":"application/octet-stream"}"#
    );
}
