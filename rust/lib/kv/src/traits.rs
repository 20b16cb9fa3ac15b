use crate::error::KVError;

/// KVStore provides a key-value storage interface with an atomic
/// compare-and-swap primitive.
///
/// Keys are namespaced; the counter store uses `seq:counters`.
/// Values are opaque bytes; callers own the encoding.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Atomically replace the value of `key` with `new` if and only if its
    /// current value equals `expected` (`None` meaning "key absent").
    ///
    /// Returns `true` when the swap happened, `false` when the current value
    /// differed and nothing was written.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, KVError>;
}
