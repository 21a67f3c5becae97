//! Concurrency tests for `Map` and the parser pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use sdk_vars::{Map, ParserPool, PoolConfig, ReadOnlyMap, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn concurrent_writers_do_not_lose_entries() {
    init_tracing();
    let m = Map::new();
    thread::scope(|s| {
        for t in 0..8 {
            let m = &m;
            s.spawn(move || {
                for i in 0..250 {
                    m.store(&format!("t{t}_{i}"), i).unwrap();
                }
            });
        }
    });
    assert_eq!(m.len(), 2000);
    assert_eq!(m.get("t7_249").as_int().unwrap(), 249);
}

#[test]
fn range_tolerates_mutation_from_callback_and_other_threads() {
    init_tracing();
    let m = Map::new();
    for i in 0..100 {
        m.store(&format!("k{i:03}"), i).unwrap();
    }

    let visits = AtomicUsize::new(0);
    thread::scope(|s| {
        s.spawn(|| {
            for i in 100..200 {
                m.store(&format!("k{i:03}"), i).unwrap();
                m.delete(&format!("k{:03}", i - 100));
            }
        });
        s.spawn(|| {
            let mut last = String::new();
            m.range(|v| {
                // Snapshot order is strictly ascending: no double visits.
                assert!(v.name() > last.as_str());
                last = v.name().to_owned();
                visits.fetch_add(1, Ordering::Relaxed);
                let _ = m.load_and_delete(v.name());
                m.store(v.name(), v.value()).unwrap();
                m.range(|_| true);
                true
            });
        });
    });

    assert!(visits.load(Ordering::Relaxed) >= 100);
    assert!(m.len() >= 100);
}

#[test]
fn read_only_entries_survive_racing_writers() {
    init_tracing();
    let m = Map::new();
    m.store_read_only("locked", "original", true).unwrap();
    thread::scope(|s| {
        for t in 0..4 {
            let m = &m;
            s.spawn(move || {
                for i in 0..100 {
                    assert!(m.store("locked", format!("{t}-{i}")).unwrap_err().is_read_only());
                    let _ = m.load_or_store("locked", "other").unwrap();
                }
            });
        }
    });
    assert_eq!(m.get("locked").as_str(), "original");
}

#[test]
fn prefix_views_are_consistent_under_writes() {
    let m = Map::new();
    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..500 {
                m.store(&format!("app.k{i}"), i).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..50 {
                let ro = ReadOnlyMap::with_prefix(&m, "app.");
                assert!(ro.keys().iter().all(|k| k.starts_with("app.")));
                assert!(ro.all().iter().all(|v| v.is_read_only()));
            }
        });
    });
    assert_eq!(m.extract_with_prefix("app.").len(), 500);
}

#[test]
fn pool_is_shared_across_threads() {
    let pool = ParserPool::new(PoolConfig::default().with_max_idle(4));
    thread::scope(|s| {
        for t in 0..8_u32 {
            let pool = &pool;
            s.spawn(move || {
                for i in 0..100_u32 {
                    let v = pool.with_pooled(|p| p.value(&(t * 1000 + i))).unwrap();
                    assert_eq!(v.as_uint32().unwrap(), t * 1000 + i);
                }
            });
        }
    });
    assert!(pool.idle() <= 4);
    assert_eq!(Value::new(1).unwrap().as_str(), "1");
}
