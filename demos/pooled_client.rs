//! The adapter pattern: a request/response client that hides pool mechanics
//! from its callers.
//!
//! Each call checks a transport out of the pool, performs the exchange,
//! buffers the entire response, and only then lets the guard return the
//! transport, so the caller can keep reading the response long after the
//! transport went back to the pool. The outstanding counter is the adapter's
//! own observability state, not the pool's.

use corral::{FactoryError, Pool, PoolResult};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Stand-in for a real client connection.
struct Transport {
    id: u32,
}

impl Transport {
    fn exchange(&self, request: &str) -> Cursor<Vec<u8>> {
        // A real transport would stream this from the wire.
        thread::sleep(Duration::from_millis(10));
        Cursor::new(format!("[{}] echo: {request}", self.id).into_bytes())
    }
}

struct PooledClient {
    transports: Pool<Transport>,
    timeout: Option<Duration>,
    outstanding: AtomicUsize,
}

impl PooledClient {
    fn new(size: usize, timeout: Option<Duration>) -> PoolResult<Self> {
        let mut next = 0u32;
        let transports = Pool::new(size, move || {
            let id = next;
            next += 1;
            Ok::<_, FactoryError>(Transport { id })
        })?;

        Ok(Self {
            transports,
            timeout,
            outstanding: AtomicUsize::new(0),
        })
    }

    fn request(&self, request: &str) -> PoolResult<String> {
        let transport = match self.timeout {
            Some(timeout) => self.transports.checkout_timeout(timeout)?,
            None => self.transports.checkout()?,
        };
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        // Fully buffer the response so the transport is free to go back
        // before the caller touches the body.
        let mut body = String::new();
        transport
            .exchange(request)
            .read_to_string(&mut body)
            .expect("in-memory response is valid utf-8");

        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        Ok(body)
    }

    fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        self.transports.close();
    }
}

fn main() {
    let client = Arc::new(
        PooledClient::new(2, Some(Duration::from_secs(1))).expect("factory cannot fail here"),
    );

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let body = client
                    .request(&format!("hello from worker {worker}"))
                    .expect("request failed");
                println!("{body} (outstanding now: {})", client.outstanding());
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    println!(
        "all done: {} idle transports, {} outstanding",
        client.transports.len(),
        client.outstanding()
    );
    client.shutdown();
}
