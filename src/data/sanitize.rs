//! Host identifier sanitization and render-target key assignment.
//!
//! Host identifiers arrive from the backend unchecked (`"10.0.0.1"`,
//! `"db.internal:5432"`, ...). Render targets need a restricted alphabet, so
//! [`sanitize`] strips everything outside `[A-Za-z0-9_-]`. The filter is lossy:
//! `"a.b"` and `"a:b"` both become `"ab"`. [`TargetKeys`] keeps host
//! identifiers and target keys as separate namespaces and guarantees that no
//! two live hosts share a key.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Key used when a host identifier sanitizes to nothing.
const EMPTY_KEY_STEM: &str = "host";

/// Strip every character that is not ASCII alphanumeric, `_` or `-`.
///
/// Total and idempotent. Distinct inputs may map to the same output; use
/// [`TargetKeys`] when uniqueness matters.
pub fn sanitize(host: &str) -> String {
    host.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect()
}

/// A render-target key. Only ever built by [`TargetKeys`] or for fixed
/// dashboard-wide targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(String);

impl TargetKey {
    /// A fixed key that does not belong to any host.
    pub fn fixed(name: &str) -> Self {
        Self(sanitize(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

/// Bidirectional, collision-checked mapping between host identifiers and
/// target keys.
///
/// A host keeps its key for as long as it stays assigned, so the same host
/// resolves to the same target on every cycle. The first host to claim a
/// sanitized stem gets it verbatim; later colliding hosts get the stem plus a
/// hash suffix of their full identifier.
#[derive(Debug, Clone, Default)]
pub struct TargetKeys {
    by_host: HashMap<String, TargetKey>,
    by_key: HashMap<TargetKey, String>,
    reserved: HashSet<TargetKey>,
}

impl TargetKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping that never hands out any of `reserved` to a host.
    pub fn with_reserved<I>(reserved: I) -> Self
    where
        I: IntoIterator<Item = TargetKey>,
    {
        Self {
            reserved: reserved.into_iter().collect(),
            ..Self::default()
        }
    }

    fn is_taken(&self, key: &TargetKey) -> bool {
        self.by_key.contains_key(key) || self.reserved.contains(key)
    }

    /// Return the key for `host`, assigning one on first sight.
    pub fn assign(&mut self, host: &str) -> TargetKey {
        if let Some(key) = self.by_host.get(host) {
            return key.clone();
        }

        let mut stem = sanitize(host);
        if stem.is_empty() {
            stem = EMPTY_KEY_STEM.to_string();
        }

        let mut key = TargetKey(stem.clone());
        if self.is_taken(&key) {
            let hashed = format!("{}-{:08x}", stem, fnv1a(host));
            key = TargetKey(hashed.clone());
            let mut n = 1u32;
            while self.is_taken(&key) {
                key = TargetKey(format!("{}-{}", hashed, n));
                n += 1;
            }
        }

        self.by_host.insert(host.to_string(), key.clone());
        self.by_key.insert(key.clone(), host.to_string());
        key
    }

    /// Key currently held by `host`, if any.
    pub fn key_for(&self, host: &str) -> Option<&TargetKey> {
        self.by_host.get(host)
    }

    /// Host currently holding `key`, if any.
    pub fn host_for(&self, key: &TargetKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Release the key held by `host` so it can be reused.
    pub fn release(&mut self, host: &str) -> Option<TargetKey> {
        let key = self.by_host.remove(host)?;
        self.by_key.remove(&key);
        Some(key)
    }

    /// Release every host for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let dropped: Vec<String> =
            self.by_host.keys().filter(|h| !keep(h.as_str())).cloned().collect();
        for host in dropped {
            self.release(&host);
        }
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_host.clear();
        self.by_key.clear();
    }
}

/// 32-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in s.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_disallowed() {
        assert_eq!(sanitize("10.0.0.1"), "10001");
        assert_eq!(sanitize("db-01_eu.example.com"), "db-01_euexamplecom");
        assert_eq!(sanitize("héllo wörld"), "hllowrld");
    }

    #[test]
    fn test_sanitize_total() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize(".:/ \t"), "");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for input in ["a.b", "x_y-z", "::1", "", "Ünïcode-42"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_assign_is_stable() {
        let mut keys = TargetKeys::new();
        let first = keys.assign("10.0.0.1");
        let second = keys.assign("10.0.0.1");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "10001");
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_colliding_hosts_get_distinct_keys() {
        let mut keys = TargetKeys::new();
        let a = keys.assign("a.b");
        let b = keys.assign("a:b");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "ab");
        assert!(b.as_str().starts_with("ab-"));
        assert_eq!(keys.host_for(&a), Some("a.b"));
        assert_eq!(keys.host_for(&b), Some("a:b"));
    }

    #[test]
    fn test_suffixed_key_collision_falls_back_to_counter() {
        let mut keys = TargetKeys::new();
        let taken = format!("ab-{:08x}", fnv1a("a:b"));
        // A host whose sanitized form equals the hashed key for "a:b".
        keys.assign(&taken);
        keys.assign("ab");
        let third = keys.assign("a:b");
        assert_eq!(third.as_str(), format!("{}-1", taken));
    }

    #[test]
    fn test_empty_sanitized_host_gets_placeholder() {
        let mut keys = TargetKeys::new();
        let a = keys.assign("...");
        let b = keys.assign("::");
        assert_eq!(a.as_str(), "host");
        assert!(b.as_str().starts_with("host-"));
    }

    #[test]
    fn test_release_frees_key() {
        let mut keys = TargetKeys::new();
        keys.assign("a.b");
        let released = keys.release("a.b").unwrap();
        assert_eq!(released.as_str(), "ab");
        assert!(keys.is_empty());
        assert_eq!(keys.assign("a:b").as_str(), "ab");
    }

    #[test]
    fn test_retain_drops_missing_hosts() {
        let mut keys = TargetKeys::new();
        keys.assign("alpha");
        keys.assign("beta");
        keys.retain(|h| h == "beta");
        assert!(keys.key_for("alpha").is_none());
        assert!(keys.key_for("beta").is_some());
    }

    #[test]
    fn test_reserved_keys_are_never_assigned() {
        let mut keys = TargetKeys::with_reserved([TargetKey::fixed("fleet")]);
        let key = keys.assign("fleet");
        assert_ne!(key, TargetKey::fixed("fleet"));
        assert!(key.as_str().starts_with("fleet-"));
    }

    #[test]
    fn test_target_key_display() {
        let key = TargetKey::fixed("fleet-latency");
        assert_eq!(key.to_string(), "chart-fleet-latency");
    }
}
