//! Queue integrity under concurrent producers

mod helpers;

use helpers::{audio, RecordingEncoder};
use hls_audio::{AudioQueue, Stream, StreamConfig};
use std::collections::HashSet;
use std::sync::Arc;

const PRODUCERS: i64 = 8;
const ITEMS_PER_PRODUCER: i64 = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_nothing() {
    let queue = AudioQueue::new();

    let mut handles = Vec::new();
    for producer in 0..PRODUCERS {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            for n in 0..ITEMS_PER_PRODUCER {
                queue.append(audio(producer * ITEMS_PER_PRODUCER + n));
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = (PRODUCERS * ITEMS_PER_PRODUCER) as usize;
    assert_eq!(queue.len(), total);

    let mut seen = HashSet::new();
    while let Ok(item) = queue.dequeue() {
        let (info, _) = item.into_parts();
        assert!(seen.insert(info.id), "item {} dequeued twice", info.id);
    }
    assert_eq!(seen.len(), total);
    assert!(queue.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_producer_order_is_preserved() {
    let queue = AudioQueue::new();

    let mut handles = Vec::new();
    for producer in 0..PRODUCERS {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            for n in 0..ITEMS_PER_PRODUCER {
                queue.append(audio(producer * ITEMS_PER_PRODUCER + n));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut last_seen = vec![-1i64; PRODUCERS as usize];
    while let Ok(item) = queue.dequeue() {
        let id = item.into_parts().0.id;
        let producer = (id / ITEMS_PER_PRODUCER) as usize;
        assert!(id > last_seen[producer], "producer {} items out of order", producer);
        last_seen[producer] = id;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_appends_during_drain_are_all_encoded() {
    let encoder = RecordingEncoder::new();
    let stream =
        Stream::with_encoder(StreamConfig::new(["128k"]), Arc::new(encoder.clone())).unwrap();

    let mut producers = Vec::new();
    for producer in 0..4i64 {
        let stream = stream.clone();
        producers.push(tokio::spawn(async move {
            for n in 0..25 {
                stream.append(audio(producer * 100 + n));
                tokio::task::yield_now().await;
            }
        }));
    }

    // Keep re-invoking until producers are done and nothing is left
    let mut processed = 0;
    loop {
        processed += stream.drain().await.unwrap();
        let producers_done = producers.iter().all(|p| p.is_finished());
        if producers_done && stream.queue_size() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(processed, 100);
    assert_eq!(encoder.count(), 100);

    let inputs: HashSet<Vec<u8>> = encoder.invocations().into_iter().map(|i| i.input).collect();
    assert_eq!(inputs.len(), 100);
}
