//! Utility types.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion-ordered map; the order of entries is part of a grammar's meaning.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
