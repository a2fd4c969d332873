//! Shared data-model types: symbols, rules, configuration, and diagnostics.

pub mod config;
pub mod error;
pub mod rule;
pub mod symbol;

/// A plain growable array. Named to match the teacher's `Array<T>` alias so
/// that the rest of the crate reads the same way as the grammar/parser-db
/// tables it is modeled on.
pub type Array<T> = Vec<T>;

/// An unordered hash map, for lookups where iteration order is irrelevant.
pub type Map<K, V> = std::collections::HashMap<K, V>;

/// An unordered hash set, for membership tests where iteration order is
/// irrelevant.
pub type Set<T> = std::collections::HashSet<T>;

/// An insertion-ordered map, used wherever iteration order must be
/// reproducible (e.g. symbol and rule tables, where ids are assigned by
/// first-mention order).
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V>;

/// An insertion-ordered set.
pub type OrderedSet<T> = indexmap::IndexSet<T>;
