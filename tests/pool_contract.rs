//! Contract tests for the acquire/release/close protocol.

use corral::{FactoryError, Pool, PoolConfig, PoolError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

fn counting_pool(capacity: usize) -> Pool<u32> {
    let mut next = 0u32;
    Pool::new(capacity, move || {
        let id = next;
        next += 1;
        Ok::<_, FactoryError>(id)
    })
    .unwrap()
}

#[test]
fn prefill_yields_full_len() {
    for capacity in [0, 1, 7, 30] {
        let pool = counting_pool(capacity);
        assert_eq!(pool.len(), capacity);
        assert_eq!(pool.capacity(), capacity);
        assert_eq!(pool.in_use(), 0);
    }
}

#[test]
fn factory_failure_aborts_construction() {
    let mut calls = 0;
    let result = Pool::new(5, move || {
        calls += 1;
        if calls == 3 {
            Err::<u32, FactoryError>("connection refused".into())
        } else {
            Ok(calls)
        }
    });

    let err = result.unwrap_err();
    assert!(matches!(err, PoolError::FactoryFailed(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn exhausting_the_pool_blocks_the_next_acquire() {
    let pool = counting_pool(3);
    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.acquire().unwrap());
    }
    assert_eq!(pool.len(), 0);

    let (done_tx, done_rx) = mpsc::channel();
    let waiter = {
        let pool = pool.clone();
        thread::spawn(move || {
            let handle = pool.acquire().unwrap();
            done_tx.send(()).unwrap();
            pool.release(handle).unwrap();
        })
    };

    // The fourth acquire must still be waiting...
    assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

    // ...until a handle comes back.
    pool.release(held.pop().unwrap()).unwrap();
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("waiter never got a handle");
    waiter.join().unwrap();
}

#[test]
fn release_round_trip_restores_len() {
    let pool = counting_pool(4);
    let before = pool.len();
    let handle = pool.acquire().unwrap();
    assert_eq!(pool.len(), before - 1);
    pool.release(handle).unwrap();
    assert_eq!(pool.len(), before);
}

#[test]
fn double_release_is_a_noop() {
    let pool = counting_pool(2);
    let handle = pool.acquire().unwrap();
    let dup = handle.clone();

    pool.release(handle).unwrap();
    assert_eq!(pool.len(), 2);

    pool.release(dup).unwrap();
    assert_eq!(pool.len(), 2);
}

#[test]
fn timeout_law() {
    let pool = counting_pool(1);
    let _held = pool.acquire().unwrap();

    let wait = Duration::from_millis(10);
    let start = Instant::now();
    let err = pool.acquire_timeout(wait).unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, PoolError::TimedOut(_)));
    assert!(elapsed >= wait);
    assert!(elapsed < Duration::from_secs(1), "timeout overshot: {elapsed:?}");
}

#[test]
fn close_law() {
    let pool = counting_pool(3);
    pool.close();

    assert!(pool.is_closed());
    assert_eq!(pool.len(), 0);
    assert!(matches!(pool.acquire(), Err(PoolError::Closed)));
    assert!(matches!(
        pool.acquire_timeout(Duration::from_millis(10)),
        Err(PoolError::Closed)
    ));

    // Second close is a no-op, not a panic or a deadlock.
    pool.close();
    assert_eq!(pool.len(), 0);
}

#[test]
fn blocked_acquire_wakes_on_close() {
    let pool = counting_pool(1);
    let _held = pool.acquire().unwrap();

    let waiter = {
        let pool = pool.clone();
        thread::spawn(move || pool.acquire())
    };

    thread::sleep(Duration::from_millis(30));
    pool.close();

    let result = waiter.join().unwrap();
    assert!(matches!(result, Err(PoolError::Closed)));
}

#[test]
fn release_after_close_is_a_silent_noop() {
    let pool = counting_pool(2);
    let handle = pool.acquire().unwrap();
    pool.close();

    pool.release(handle).unwrap();
    assert_eq!(pool.len(), 0);
}

#[test]
fn foreign_handle_is_rejected() {
    let lender = counting_pool(1);
    let full = counting_pool(1);

    let stray = lender.acquire().unwrap();
    let err = full.release(stray).unwrap_err();
    assert!(matches!(err, PoolError::InvalidArgument));
}

#[test]
fn sequential_integer_scenario() {
    let pool = counting_pool(3);

    let mut held: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    let mut values: Vec<u32> = held.iter().map(|handle| **handle).collect();
    values.sort_unstable();
    assert_eq!(values, [0, 1, 2]);
    assert_eq!(pool.len(), 0);

    let err = pool.acquire_timeout(Duration::from_millis(10)).unwrap_err();
    assert!(matches!(err, PoolError::TimedOut(_)));

    let first = held.pop().unwrap();
    let released_value = *first;
    pool.release(first).unwrap();
    assert_eq!(pool.len(), 1);

    let again = pool.acquire().unwrap();
    assert_eq!(*again, released_value);
}

#[test]
fn concurrent_use_never_exceeds_capacity() {
    let pool = counting_pool(2);
    let active = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..10)
        .map(|_| {
            let pool = pool.clone();
            let active = Arc::clone(&active);
            thread::spawn(move || {
                let handle = pool.acquire().unwrap();
                let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                assert!(now_active <= 2, "{now_active} handles in use at once");
                thread::sleep(Duration::from_millis(5));
                active.fetch_sub(1, Ordering::SeqCst);
                pool.release(handle).unwrap();
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(pool.len(), 2);
    assert_eq!(active.load(Ordering::SeqCst), 0);
}

static EVICTED: AtomicUsize = AtomicUsize::new(0);

fn count_eviction(_resource: &u32) {
    EVICTED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn close_runs_evict_hook_per_owned_resource() {
    let mut next = 0u32;
    let pool = Pool::with_config(
        3,
        move || {
            let id = next;
            next += 1;
            Ok::<_, FactoryError>(id)
        },
        PoolConfig::new().with_on_evict(count_eviction),
    )
    .unwrap();

    let held = pool.acquire().unwrap();
    pool.close();
    assert_eq!(EVICTED.load(Ordering::SeqCst), 2);

    // A release arriving after close still routes the resource through the
    // hook before dropping it.
    pool.release(held).unwrap();
    assert_eq!(EVICTED.load(Ordering::SeqCst), 3);
}
