//! # corral
//!
//! Bounded, thread-safe pool of reusable resource handles that blocks
//! callers when exhausted instead of growing unbounded or failing fast.
//!
//! ## Features
//!
//! - Fixed capacity, filled once by a factory at construction
//! - Blocking acquire, bounded-wait acquire, and non-blocking try-acquire
//! - Async acquire variants with timeout and cancellation
//! - Automatic release via RAII checkout guards
//! - Double-release and release-after-close are harmless no-ops
//! - Deterministic teardown: close wakes blocked waiters and runs an
//!   optional per-resource eviction hook
//!
//! ## Quick Start
//!
//! ```rust
//! use corral::{FactoryError, Pool};
//!
//! let pool = Pool::new(3, || Ok::<_, FactoryError>(String::from("conn"))).unwrap();
//!
//! let handle = pool.acquire().unwrap();
//! println!("using {}", *handle);
//! pool.release(handle).unwrap();
//!
//! // Or let a guard release for you:
//! {
//!     let conn = pool.checkout().unwrap();
//!     println!("using {}", *conn);
//! }
//! assert_eq!(pool.len(), 3);
//! ```

mod config;
mod errors;
mod handle;
mod pool;

pub use config::PoolConfig;
pub use errors::{FactoryError, PoolError, PoolResult};
pub use handle::Handle;
pub use pool::{Checkout, Pool};
