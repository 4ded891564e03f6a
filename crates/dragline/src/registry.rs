#![forbid(unsafe_code)]

//! The live container collection.
//!
//! Hosts add and remove containers at any time, including mid-drag. The
//! controller never snapshots this list: every membership check re-reads it,
//! then falls back to the dynamic `is_container` predicate.

/// Ordered set of container identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRegistry<N> {
    containers: Vec<N>,
}

impl<N> Default for ContainerRegistry<N> {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
        }
    }
}

impl<N: Copy + Eq> ContainerRegistry<N> {
    /// Create a registry from an ordered collection. Duplicates are dropped.
    pub fn new(containers: impl IntoIterator<Item = N>) -> Self {
        let mut registry = Self::default();
        for container in containers {
            registry.push(container);
        }
        registry
    }

    /// Append `container`. Returns `false` if it was already registered.
    pub fn push(&mut self, container: N) -> bool {
        if self.contains(container) {
            return false;
        }
        self.containers.push(container);
        true
    }

    /// Unregister `container`. Returns whether it was present.
    pub fn remove(&mut self, container: N) -> bool {
        let before = self.containers.len();
        self.containers.retain(|c| *c != container);
        self.containers.len() != before
    }

    #[must_use]
    pub fn contains(&self, container: N) -> bool {
        self.containers.contains(&container)
    }

    /// Registered containers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = N> + '_ {
        self.containers.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
    }

    pub fn retain(&mut self, keep: impl FnMut(&N) -> bool) {
        self.containers.retain(keep);
    }
}

impl<N: Copy + Eq> Extend<N> for ContainerRegistry<N> {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        for container in iter {
            self.push(container);
        }
    }
}
