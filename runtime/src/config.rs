//! Store tuning

/// Settings applied when a [`Store`](crate::Store) is built
///
/// ```
/// use todoapp_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_broadcast_capacity(256);
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Actions buffered per observer before it starts lagging
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Replace the broadcast buffer size (clamped to at least one)
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
        }
    }
}
