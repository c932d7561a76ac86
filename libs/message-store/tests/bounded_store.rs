use std::collections::HashSet;
use std::sync::Arc;

use message_store::{BoundedStore, DEFAULT_CAPACITY};
use whisper_api::{MessageRecord, ReceivedRecord};

fn token(i: usize) -> String {
    format!("{i:04x}")
}

#[tokio::test]
async fn snapshot_holds_last_n_in_order() {
    for count in 0..=12 {
        let store = BoundedStore::new(DEFAULT_CAPACITY).unwrap();
        for i in 0..count {
            store.add(MessageRecord::new(token(i))).await;
        }

        let snap: Vec<String> = store.snapshot().await.into_iter().map(|r| r.content).collect();
        let expected: Vec<String> = (count.saturating_sub(DEFAULT_CAPACITY)..count).map(token).collect();

        assert_eq!(snap.len(), count.min(DEFAULT_CAPACITY), "count={count}");
        assert_eq!(snap, expected, "count={count}");
    }
}

#[tokio::test]
async fn contains_matches_snapshot() {
    let store = BoundedStore::new(3).unwrap();
    for i in 0..7 {
        store.add(ReceivedRecord::new(token(i), i % 2 == 0)).await;
    }

    let held: HashSet<String> = store.snapshot().await.into_iter().map(|r| r.random_value).collect();
    for i in 0..7 {
        assert_eq!(store.contains(&token(i)).await, held.contains(&token(i)), "token {i}");
    }

    store.clear().await;
    for i in 0..7 {
        assert!(!store.contains(&token(i)).await);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_stay_bounded() {
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 200;

    let store = Arc::new(BoundedStore::new(DEFAULT_CAPACITY).unwrap());

    let mut handles = Vec::new();
    for w in 0..WRITERS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..PER_WRITER {
                store.add(MessageRecord::new(format!("{w}-{i}"))).await;
            }
        }));
    }

    // Readers racing the writers never observe an overfull store.
    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                let snap = store.snapshot().await;
                assert!(snap.len() <= DEFAULT_CAPACITY);
                tokio::task::yield_now().await;
            }
        })
    };

    for h in handles {
        h.await.unwrap();
    }
    reader.await.unwrap();

    let snap = store.snapshot().await;
    assert_eq!(snap.len(), DEFAULT_CAPACITY);

    let unique: HashSet<&str> = snap.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(unique.len(), DEFAULT_CAPACITY);

    // Writes are serialized: each writer's surviving records keep its own order.
    for w in 0..WRITERS {
        let prefix = format!("{w}-");
        let seq: Vec<usize> = snap
            .iter()
            .filter_map(|r| r.content.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert!(seq.windows(2).all(|p| p[0] < p[1]), "writer {w}: {seq:?}");
    }

    // The very last add of some writer must be the newest record.
    let newest = &snap.last().unwrap().content;
    assert!(newest.ends_with(&format!("-{}", PER_WRITER - 1)), "newest = {newest}");
}
