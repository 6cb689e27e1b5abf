//! Resolution metadata for correlation reads.
//!
//! A resolved value always says which path produced it, so callers and tests
//! can tell a direct cache hit from a rebuild without inspecting the stores.

use chrono::{DateTime, Utc};

/// Which path produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPath {
    /// Well-formed entry found in the cache.
    Direct,
    /// Entry rebuilt from transaction history.
    Rebuild,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Rebuild => "rebuild",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolved<T> {
    value: T,
    path: ResolutionPath,
    resolved_at: DateTime<Utc>,
    /// Whether a rebuilt value made it back into the cache.
    written_back: bool,
}

impl<T> Resolved<T> {
    pub fn direct(value: T) -> Self {
        Self {
            value,
            path: ResolutionPath::Direct,
            resolved_at: Utc::now(),
            written_back: false,
        }
    }

    pub fn rebuilt(value: T, written_back: bool) -> Self {
        Self {
            value,
            path: ResolutionPath::Rebuild,
            resolved_at: Utc::now(),
            written_back,
        }
    }

    pub fn path(&self) -> ResolutionPath {
        self.path
    }

    pub fn was_cache_hit(&self) -> bool {
        self.path == ResolutionPath::Direct
    }

    pub fn written_back(&self) -> bool {
        self.written_back
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_is_cache_hit() {
        let read = Resolved::direct(42);
        assert!(read.was_cache_hit());
        assert_eq!(read.path().as_str(), "direct");
        assert!(!read.written_back());
        assert_eq!(read.into_value(), 42);
    }

    #[test]
    fn test_rebuilt_tracks_write_back() {
        let read = Resolved::rebuilt("v", false);
        assert!(!read.was_cache_hit());
        assert_eq!(read.path(), ResolutionPath::Rebuild);
        assert!(!read.written_back());
        assert!(Resolved::rebuilt("v", true).written_back());
        assert!(read.resolved_at() <= Utc::now());
    }
}
