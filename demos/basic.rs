//! Basic pool usage: construction, manual acquire/release, scoped checkout,
//! and teardown.

use corral::{FactoryError, Pool, PoolConfig};
use std::time::Duration;

fn report_closed(conn: &String) {
    println!("tearing down {conn}");
}

fn main() {
    let mut next = 0u32;
    let pool = Pool::with_config(
        3,
        move || {
            let id = next;
            next += 1;
            Ok::<_, FactoryError>(format!("conn-{id}"))
        },
        PoolConfig::new().with_on_evict(report_closed),
    )
    .expect("factory cannot fail here");

    println!("idle handles after fill: {}", pool.len());

    // Manual protocol: acquire, use, release.
    let handle = pool.acquire().expect("pool is open");
    println!("checked out {}", *handle);
    println!("idle while checked out: {}", pool.len());
    pool.release(handle).expect("handle belongs to this pool");

    // Scoped protocol: the guard releases on every exit path.
    {
        let conn = pool.checkout().expect("pool is open");
        println!("scoped use of {}", *conn);
    }
    println!("idle after scope: {}", pool.len());

    // Bounded wait while the pool is exhausted.
    let held: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    match pool.acquire_timeout(Duration::from_millis(50)) {
        Err(err) => println!("fourth acquire: {err}"),
        Ok(_) => unreachable!("pool is exhausted"),
    }
    for handle in held {
        pool.release(handle).unwrap();
    }

    pool.close();
    println!("idle after close: {}", pool.len());
}
