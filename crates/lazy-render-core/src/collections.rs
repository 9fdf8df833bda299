//! Hash collections shared by the registry and the testing host.
//!
//! FxHash by default; enable `std-hash` to fall back to SipHash.

#[cfg(feature = "std-hash")]
pub type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(not(feature = "std-hash"))]
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(feature = "std-hash")]
pub type Set<T> = std::collections::HashSet<T>;

#[cfg(not(feature = "std-hash"))]
pub type Set<T> = rustc_hash::FxHashSet<T>;
