#![forbid(unsafe_code)]

//! Host policy callbacks and the options bundle a controller is built from.
//!
//! Every callback receives the tree read-only as its first argument, so
//! hosts can inspect labels, markers, or their own node data without
//! capturing shared state.
//!
//! | Callback | Default | Consulted |
//! |----------|---------|-----------|
//! | `is_container(tree, el)` | `false` | membership checks, after the static list |
//! | `moves(tree, item, source, handle, sibling)` | `true` | grab resolution |
//! | `accepts(tree, item, target, source, reference)` | `true` | every drop-target resolution |
//! | `invalid(tree, el, handle)` | `false` | every node visited by the grab walk |
//! | `copy_when(tree, item, source)` | `config.copy` | once per confirmed drag |

use std::fmt;

use dragline_core::tree::NodeTree;

use crate::config::{ConfigError, DragConfig};

type NodeOf<T> = <T as NodeTree>::Node;
type Predicate1<T> = Box<dyn Fn(&T, NodeOf<T>) -> bool>;
type Predicate2<T> = Box<dyn Fn(&T, NodeOf<T>, NodeOf<T>) -> bool>;
type Predicate4<T> =
    Box<dyn Fn(&T, NodeOf<T>, NodeOf<T>, NodeOf<T>, Option<NodeOf<T>>) -> bool>;

/// Veto callbacks. Immutable once a controller owns them.
pub struct Policy<T: NodeTree> {
    is_container: Predicate1<T>,
    moves: Predicate4<T>,
    accepts: Predicate4<T>,
    invalid: Predicate2<T>,
    copy_when: Option<Predicate2<T>>,
}

impl<T: NodeTree> Default for Policy<T> {
    fn default() -> Self {
        Self {
            is_container: Box::new(|_, _| false),
            moves: Box::new(|_, _, _, _, _| true),
            accepts: Box::new(|_, _, _, _, _| true),
            invalid: Box::new(|_, _, _| false),
            copy_when: None,
        }
    }
}

impl<T: NodeTree> fmt::Debug for Policy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("copy_when", &self.copy_when.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl<T: NodeTree> Policy<T> {
    /// Dynamic container predicate.
    #[must_use]
    pub fn is_container(&self, tree: &T, el: NodeOf<T>) -> bool {
        (self.is_container)(tree, el)
    }

    /// May `item` leave `source` when grabbed by `handle`?
    #[must_use]
    pub fn moves(
        &self,
        tree: &T,
        item: NodeOf<T>,
        source: NodeOf<T>,
        handle: NodeOf<T>,
        sibling: Option<NodeOf<T>>,
    ) -> bool {
        (self.moves)(tree, item, source, handle, sibling)
    }

    /// May `item` land in `target` before `reference`?
    #[must_use]
    pub fn accepts(
        &self,
        tree: &T,
        item: NodeOf<T>,
        target: NodeOf<T>,
        source: NodeOf<T>,
        reference: Option<NodeOf<T>>,
    ) -> bool {
        (self.accepts)(tree, item, target, source, reference)
    }

    /// Is `el` off-limits as a drag start when `handle` was pressed?
    #[must_use]
    pub fn invalid(&self, tree: &T, el: NodeOf<T>, handle: NodeOf<T>) -> bool {
        (self.invalid)(tree, el, handle)
    }

    /// Copy decision for `item` leaving `source`: the `copy_when` predicate
    /// if one is set, else `fallback` (the plain `copy` flag).
    #[must_use]
    pub fn copies(&self, tree: &T, item: NodeOf<T>, source: NodeOf<T>, fallback: bool) -> bool {
        match &self.copy_when {
            Some(copy_when) => copy_when(tree, item, source),
            None => fallback,
        }
    }

    /// Whether copies are decided per drag.
    #[must_use]
    pub fn has_copy_predicate(&self) -> bool {
        self.copy_when.is_some()
    }
}

/// Everything a controller is built from: initial containers, callbacks,
/// and plain options.
///
/// ```rust,ignore
/// let options = DragOptions::new()
///     .containers([left, right])
///     .revert_on_spill(true)
///     .accepts(|_, _, target, _, _| target != trash);
/// ```
pub struct DragOptions<T: NodeTree> {
    pub containers: Vec<NodeOf<T>>,
    pub policy: Policy<T>,
    pub config: DragConfig,
}

impl<T: NodeTree> Default for DragOptions<T> {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
            policy: Policy::default(),
            config: DragConfig::default(),
        }
    }
}

impl<T: NodeTree> fmt::Debug for DragOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragOptions")
            .field("containers", &self.containers)
            .field("policy", &self.policy)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: NodeTree> DragOptions<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial static containers.
    #[must_use]
    pub fn containers(mut self, containers: impl IntoIterator<Item = NodeOf<T>>) -> Self {
        self.containers = containers.into_iter().collect();
        self
    }

    /// Replace all plain options. A `copy_when` predicate stays in force.
    #[must_use]
    pub fn config(mut self, config: DragConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn is_container(mut self, f: impl Fn(&T, NodeOf<T>) -> bool + 'static) -> Self {
        self.policy.is_container = Box::new(f);
        self
    }

    #[must_use]
    pub fn moves(
        mut self,
        f: impl Fn(&T, NodeOf<T>, NodeOf<T>, NodeOf<T>, Option<NodeOf<T>>) -> bool + 'static,
    ) -> Self {
        self.policy.moves = Box::new(f);
        self
    }

    #[must_use]
    pub fn accepts(
        mut self,
        f: impl Fn(&T, NodeOf<T>, NodeOf<T>, NodeOf<T>, Option<NodeOf<T>>) -> bool + 'static,
    ) -> Self {
        self.policy.accepts = Box::new(f);
        self
    }

    #[must_use]
    pub fn invalid(mut self, f: impl Fn(&T, NodeOf<T>, NodeOf<T>) -> bool + 'static) -> Self {
        self.policy.invalid = Box::new(f);
        self
    }

    /// Fixed copy semantics for every drag. Clears any `copy_when`.
    #[must_use]
    pub fn copy(mut self, copy: bool) -> Self {
        self.config.copy = copy;
        self.policy.copy_when = None;
        self
    }

    /// Per-drag copy decision from `(tree, item, source)`. Takes precedence
    /// over `config.copy`.
    #[must_use]
    pub fn copy_when(mut self, f: impl Fn(&T, NodeOf<T>, NodeOf<T>) -> bool + 'static) -> Self {
        self.policy.copy_when = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn copy_sort_source(mut self, enabled: bool) -> Self {
        self.config.copy_sort_source = enabled;
        self
    }

    #[must_use]
    pub fn revert_on_spill(mut self, enabled: bool) -> Self {
        self.config.revert_on_spill = enabled;
        self
    }

    #[must_use]
    pub fn remove_on_spill(mut self, enabled: bool) -> Self {
        self.config.remove_on_spill = enabled;
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: dragline_core::geometry::Direction) -> Self {
        self.config.direction = direction;
        self
    }

    #[must_use]
    pub fn ignore_input_text_selection(mut self, enabled: bool) -> Self {
        self.config.ignore_input_text_selection = enabled;
        self
    }

    /// Per-axis slide slack before a press becomes a drag.
    #[must_use]
    pub fn slide_factors(mut self, x: f64, y: f64) -> Self {
        self.config.slide_factor_x = x;
        self.config.slide_factor_y = y;
        self
    }

    /// [`DragConfig::validate`] plus checks that need the callbacks.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.config.validate();
        if self.config.copy_sort_source && !self.config.copy && !self.policy.has_copy_predicate()
        {
            errors.push(
                "copy_sort_source has no effect: copy is off and no copy_when is set".to_owned(),
            );
        }
        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing, else the list.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
