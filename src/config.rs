//! Pool configuration options

use std::time::Duration;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use corral::PoolConfig;
/// use std::time::Duration;
///
/// fn drop_conn(_conn: &String) {}
///
/// let config = PoolConfig::<String>::new()
///     .with_on_evict(drop_conn)
///     .with_poll_interval(Duration::from_millis(5));
///
/// assert!(config.on_evict.is_some());
/// assert_eq!(config.poll_interval, Duration::from_millis(5));
/// ```
#[derive(Debug)]
pub struct PoolConfig<T> {
    /// Hook invoked for each resource the pool still owns when it is closed.
    /// The default is no cleanup; resource teardown belongs to the resource's
    /// own type unless a hook is supplied.
    pub on_evict: Option<fn(&T)>,

    /// Interval between free-queue polls in the async acquire variants.
    pub poll_interval: Duration,
}

impl<T> Default for PoolConfig<T> {
    fn default() -> Self {
        Self {
            on_evict: None,
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl<T> Clone for PoolConfig<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolConfig<T> {}

impl<T> PoolConfig<T> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eviction hook run per resource on close
    pub fn with_on_evict(mut self, hook: fn(&T)) -> Self {
        self.on_evict = Some(hook);
        self
    }

    /// Set the async acquire poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
