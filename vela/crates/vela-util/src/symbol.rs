//! Global string interning.
//!
//! Identifiers are looked up by name constantly across the analyzer and
//! code generator; interning them once up front turns every subsequent
//! comparison into a `u32` equality check instead of a string compare.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use dashmap::DashMap;

/// An interned identifier. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

struct Interner {
    map: DashMap<String, u32, ahash::RandomState>,
    strings: DashMap<u32, String, ahash::RandomState>,
    next: AtomicU32,
}

static INTERNER: LazyLock<Interner> = LazyLock::new(|| Interner {
    map: DashMap::default(),
    strings: DashMap::default(),
    next: AtomicU32::new(0),
});

impl Symbol {
    pub fn intern(s: &str) -> Self {
        if let Some(existing) = INTERNER.map.get(s) {
            return Symbol(*existing);
        }
        let id = INTERNER.next.fetch_add(1, Ordering::Relaxed);
        INTERNER.map.insert(s.to_string(), id);
        INTERNER.strings.insert(id, s.to_string());
        Symbol(id)
    }

    pub fn as_str(&self) -> String {
        INTERNER
            .strings
            .get(&self.0)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::intern(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("foo");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "foo");
    }

    #[test]
    fn distinct_strings_intern_distinct_symbols() {
        let a = Symbol::intern("alpha");
        let b = Symbol::intern("beta");
        assert_ne!(a, b);
    }
}
