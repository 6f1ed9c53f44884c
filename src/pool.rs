//! Core bounded pool implementation

use crate::config::PoolConfig;
use crate::errors::{FactoryError, PoolError, PoolResult};
use crate::handle::Handle;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A bounded, thread-safe pool of reusable resource handles.
///
/// The pool is filled once at construction by a factory and never grows.
/// Acquiring blocks the caller while the pool is exhausted; releasing puts
/// the handle back for the next waiter. Cloning a `Pool` clones a cheap
/// reference to the same shared state.
///
/// # Examples
///
/// ```
/// use corral::{FactoryError, Pool};
///
/// let pool = Pool::new(2, || Ok::<_, FactoryError>(String::from("conn"))).unwrap();
/// assert_eq!(pool.len(), 2);
///
/// let handle = pool.acquire().unwrap();
/// assert_eq!(*handle, "conn");
/// assert_eq!(pool.len(), 1);
///
/// pool.release(handle).unwrap();
/// assert_eq!(pool.len(), 2);
/// ```
pub struct Pool<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    capacity: usize,
    // The free queue. Its length is the idle count; capacity accounting is
    // derived from it and the in-use flags, never from a separate counter.
    free_rx: Receiver<Handle<T>>,
    // Present while the pool is open. close() takes the sender out under the
    // lock and drops it, which disconnects the channel and wakes blocked
    // waiters; release() sending under the same lock cannot race past close.
    free_tx: Mutex<Option<Sender<Handle<T>>>>,
    closed: AtomicBool,
    config: PoolConfig<T>,
}

impl<T> Pool<T> {
    /// Create a pool pre-filled with exactly `capacity` handles, each built
    /// by one invocation of `factory`.
    ///
    /// The first factory failure aborts construction with
    /// [`PoolError::FactoryFailed`]; no partial pool is returned. The factory
    /// is not retained after construction.
    pub fn new<F>(capacity: usize, factory: F) -> PoolResult<Self>
    where
        F: FnMut() -> Result<T, FactoryError>,
    {
        Self::with_config(capacity, factory, PoolConfig::default())
    }

    /// Create a pool with explicit configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use corral::{FactoryError, Pool, PoolConfig};
    ///
    /// fn log_evicted(_conn: &u32) {}
    ///
    /// let config = PoolConfig::new().with_on_evict(log_evicted);
    /// let pool = Pool::with_config(4, || Ok::<_, FactoryError>(7u32), config).unwrap();
    /// assert_eq!(pool.capacity(), 4);
    /// ```
    pub fn with_config<F>(capacity: usize, mut factory: F, config: PoolConfig<T>) -> PoolResult<Self>
    where
        F: FnMut() -> Result<T, FactoryError>,
    {
        let (free_tx, free_rx) = channel::bounded(capacity);

        for _ in 0..capacity {
            let resource = factory().map_err(PoolError::FactoryFailed)?;
            // The queue is sized to capacity and we send exactly capacity
            // handles, so this send cannot fail.
            let _ = free_tx.send(Handle::new(resource));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                capacity,
                free_rx,
                free_tx: Mutex::new(Some(free_tx)),
                closed: AtomicBool::new(false),
                config,
            }),
        })
    }

    /// Acquire a free handle, blocking the calling thread until one is
    /// available. Fails with [`PoolError::Closed`] without blocking if the
    /// pool is closed, and a waiter blocked here wakes with `Closed` when
    /// the pool closes under it.
    pub fn acquire(&self) -> PoolResult<Handle<T>> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        match self.shared.free_rx.recv() {
            Ok(handle) => self.admit(handle),
            Err(_) => Err(PoolError::Closed),
        }
    }

    /// Acquire a free handle, waiting at most `timeout`. If the timer fires
    /// first the caller holds no handle and gets [`PoolError::TimedOut`].
    ///
    /// # Examples
    ///
    /// ```
    /// use corral::{FactoryError, Pool, PoolError};
    /// use std::time::Duration;
    ///
    /// let pool = Pool::new(1, || Ok::<_, FactoryError>(0u8)).unwrap();
    /// let held = pool.acquire().unwrap();
    ///
    /// let err = pool.acquire_timeout(Duration::from_millis(10)).unwrap_err();
    /// assert!(matches!(err, PoolError::TimedOut(_)));
    /// # drop(held);
    /// ```
    pub fn acquire_timeout(&self, timeout: Duration) -> PoolResult<Handle<T>> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        match self.shared.free_rx.recv_timeout(timeout) {
            Ok(handle) => self.admit(handle),
            Err(RecvTimeoutError::Timeout) => Err(PoolError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(PoolError::Closed),
        }
    }

    /// Acquire a free handle without blocking. Returns `Ok(None)` when the
    /// pool is exhausted right now.
    pub fn try_acquire(&self) -> PoolResult<Option<Handle<T>>> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        match self.shared.free_rx.try_recv() {
            Ok(handle) => self.admit(handle).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PoolError::Closed),
        }
    }

    /// Acquire a free handle asynchronously, polling the free queue so the
    /// executor is never blocked. Dropping the returned future abandons the
    /// wait without holding a handle.
    pub async fn acquire_async(&self) -> PoolResult<Handle<T>> {
        loop {
            match self.try_acquire()? {
                Some(handle) => return Ok(handle),
                None => tokio::time::sleep(self.shared.config.poll_interval).await,
            }
        }
    }

    /// Acquire a free handle asynchronously, waiting at most `timeout`.
    pub async fn acquire_timeout_async(&self, timeout: Duration) -> PoolResult<Handle<T>> {
        tokio::time::timeout(timeout, self.acquire_async())
            .await
            .map_err(|_| PoolError::TimedOut(timeout))?
    }

    /// Acquire a handle wrapped in a guard that releases it when dropped,
    /// on every exit path including panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use corral::{FactoryError, Pool};
    ///
    /// let pool = Pool::new(1, || Ok::<_, FactoryError>(5i32)).unwrap();
    /// {
    ///     let guard = pool.checkout().unwrap();
    ///     assert_eq!(*guard, 5);
    ///     assert_eq!(pool.len(), 0);
    /// }
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn checkout(&self) -> PoolResult<Checkout<T>> {
        Ok(Checkout::new(self.clone(), self.acquire()?))
    }

    /// [`checkout`](Self::checkout) with a bounded wait.
    pub fn checkout_timeout(&self, timeout: Duration) -> PoolResult<Checkout<T>> {
        Ok(Checkout::new(self.clone(), self.acquire_timeout(timeout)?))
    }

    /// Return a previously acquired handle to the pool.
    ///
    /// Releasing a handle that is not checked out (double release, or never
    /// acquired) is a no-op, as is releasing into a closed pool; neither
    /// corrupts the idle count. A handle foreign to this pool that would
    /// overflow the free queue is rejected with
    /// [`PoolError::InvalidArgument`].
    pub fn release(&self, handle: Handle<T>) -> PoolResult<()> {
        if !handle.clear_in_use() {
            return Ok(());
        }

        let slot = self.shared.free_tx.lock();
        match slot.as_ref() {
            // Pool closed while the handle was out: drop it here.
            None => {
                self.evict(&handle);
                Ok(())
            }
            // The queue is sized to capacity, so for a handle that came out
            // of this pool the send always finds room and never blocks.
            Some(free_tx) => free_tx
                .try_send(handle)
                .map_err(|_| PoolError::InvalidArgument),
        }
    }

    /// Number of idle handles. A point-in-time snapshot that may be stale
    /// immediately under concurrent activity; 0 once the pool is closed.
    pub fn len(&self) -> usize {
        if self.is_closed() {
            0
        } else {
            self.shared.free_rx.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handles currently checked out; 0 once the pool is closed.
    pub fn in_use(&self) -> usize {
        if self.is_closed() {
            0
        } else {
            self.shared.capacity - self.shared.free_rx.len()
        }
    }

    /// Fixed capacity set at construction.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Close the pool. One-way and idempotent: after the first call every
    /// acquire fails with [`PoolError::Closed`], release becomes a no-op and
    /// `len()` reports 0. Waiters blocked in [`acquire`](Self::acquire) wake
    /// with `Closed`. Idle resources are handed to the configured
    /// [`on_evict`](crate::PoolConfig::on_evict) hook, if any, and dropped.
    pub fn close(&self) {
        let mut slot = self.shared.free_tx.lock();
        let Some(free_tx) = slot.take() else {
            return;
        };
        self.shared.closed.store(true, Ordering::Release);
        drop(slot);
        // Dropping the only sender disconnects the channel: blocked waiters
        // wake with a defined "no value" signal once the queue drains.
        drop(free_tx);

        while let Ok(handle) = self.shared.free_rx.try_recv() {
            self.evict(&handle);
        }
    }

    /// A handle pulled from the queue becomes the caller's, unless the pool
    /// closed while the recv was in flight.
    fn admit(&self, handle: Handle<T>) -> PoolResult<Handle<T>> {
        if self.is_closed() {
            self.evict(&handle);
            return Err(PoolError::Closed);
        }
        handle.mark_in_use();
        Ok(handle)
    }

    fn evict(&self, handle: &Handle<T>) {
        if let Some(hook) = self.shared.config.on_evict {
            hook(handle.resource());
        }
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.shared.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// RAII guard over an acquired handle: dereferences to the resource and
/// releases the handle back to its pool when dropped.
pub struct Checkout<T> {
    pool: Pool<T>,
    handle: Option<Handle<T>>,
}

impl<T> Checkout<T> {
    fn new(pool: Pool<T>, handle: Handle<T>) -> Self {
        Self {
            pool,
            handle: Some(handle),
        }
    }

    /// Borrow the underlying handle.
    pub fn handle(&self) -> &Handle<T> {
        self.handle.as_ref().expect("handle already detached")
    }

    /// Detach the handle from the guard; the caller takes over the duty of
    /// releasing it.
    pub fn into_handle(mut self) -> Handle<T> {
        self.handle.take().expect("handle already detached")
    }
}

impl<T> Deref for Checkout<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.handle().resource()
    }
}

impl<T> Drop for Checkout<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.pool.release(handle);
        }
    }
}
