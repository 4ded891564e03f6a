#![forbid(unsafe_code)]

//! Session controller.
//!
//! [`Drake`] owns the node tree, the live container list, the policy, and
//! the one drag session. Hosts forward normalized pointer events through
//! [`Drake::handle_pointer`] and drive the rest through the public
//! operations ([`start`](Drake::start), [`end`](Drake::end),
//! [`cancel`](Drake::cancel), [`remove`](Drake::remove),
//! [`destroy`](Drake::destroy), [`can_move`](Drake::can_move)).
//!
//! # Invariants
//!
//! 1. At most one [`Session`] exists. Confirming a new drag terminates the
//!    previous one first; its terminal event fires before the new `drag`.
//! 2. Every session ends with exactly one terminal event (`drop`, `cancel`,
//!    or `remove`) followed by `out` (if still hovering) and `dragend`.
//! 3. Each `out` closes a preceding `over` for the same container.
//! 4. Reprocessing a pointer position does not mutate the tree or emit
//!    `over`/`shadow` again.
//! 5. A grab walk that crosses an `invalid` node, finds no container, or
//!    is vetoed by `moves` leaves the controller untouched.
//!
//! # Failure Modes
//!
//! - **Detached nodes mid-drag**: resolution fails quietly and the release
//!   falls back to spill handling.
//! - **Listener panic**: propagates out of the triggering call. The session
//!   is left as it was at the point of the panic.

use std::fmt;

use tracing::{debug, debug_span, trace};

use dragline_core::event::{PointerEvent, PointerEventKind, PointerType};
use dragline_core::geometry::Point;
use dragline_core::gesture::PressOrigin;
use dragline_core::tree::{Markers, NodeTree, PlaceNode, is_input};

use crate::config::DragConfig;
use crate::events::{CloneKind, DragEvent, DragEventKind, EventChannel, ListenerId};
use crate::mirror::{CloneMirror, MirrorProvider};
use crate::policy::{DragOptions, Policy};
use crate::registry::ContainerRegistry;
use crate::resolver::{self, DropTarget};
use crate::session::{DragState, GrabContext, PointerResponse, Session};

/// Drag-and-drop controller over a tree `T` with tracking clones from `M`.
pub struct Drake<T: NodeTree, M: MirrorProvider<T> = CloneMirror<<T as NodeTree>::Node>> {
    tree: T,
    mirror: M,
    containers: ContainerRegistry<T::Node>,
    policy: Policy<T>,
    config: DragConfig,
    events: EventChannel<T::Node>,
    session: Option<Session<T::Node, M::Handle>>,
    grabbed: Option<GrabContext<T::Node>>,
    press: PressOrigin,
    destroyed: bool,
}

impl<T: PlaceNode> Drake<T> {
    /// Controller using `options.containers` and the default tracking clone.
    pub fn new(tree: T, options: DragOptions<T>) -> Self {
        Self::with_mirror(tree, CloneMirror::new(), options)
    }

    /// Controller whose containers are `containers`, which take precedence
    /// over `options.containers`.
    pub fn with_containers(
        tree: T,
        containers: impl IntoIterator<Item = T::Node>,
        mut options: DragOptions<T>,
    ) -> Self {
        options.containers = containers.into_iter().collect();
        Self::new(tree, options)
    }
}

impl<T: NodeTree, M: MirrorProvider<T>> Drake<T, M> {
    /// Controller with a custom tracking-clone provider.
    pub fn with_mirror(tree: T, mirror: M, options: DragOptions<T>) -> Self {
        let DragOptions {
            containers,
            policy,
            config,
        } = options;
        Self {
            tree,
            mirror,
            containers: ContainerRegistry::new(containers),
            policy,
            config,
            events: EventChannel::new(),
            session: None,
            grabbed: None,
            press: PressOrigin::default(),
            destroyed: false,
        }
    }

    // --- accessors ---

    #[must_use]
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable tree access for host edits between pointer samples.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Destroy the controller and hand back the tree.
    pub fn into_tree(mut self) -> T {
        self.destroy();
        self.tree
    }

    #[must_use]
    pub fn containers(&self) -> &ContainerRegistry<T::Node> {
        &self.containers
    }

    /// The live container list. Changes apply from the next sample on.
    pub fn containers_mut(&mut self) -> &mut ContainerRegistry<T::Node> {
        &mut self.containers
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub fn policy(&self) -> &Policy<T> {
        &self.policy
    }

    #[must_use]
    pub fn mirror_provider(&self) -> &M {
        &self.mirror
    }

    /// The active session, if dragging.
    #[must_use]
    pub fn session(&self) -> Option<&Session<T::Node, M::Handle>> {
        self.session.as_ref()
    }

    /// The pending grab, if any.
    #[must_use]
    pub fn grabbed(&self) -> Option<GrabContext<T::Node>> {
        self.grabbed
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        if self.session.is_some() {
            DragState::Dragging
        } else if self.grabbed.is_some() {
            DragState::Grabbed
        } else {
            DragState::Idle
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether click, selection-start, and touch-move defaults must be
    /// suppressed right now.
    #[must_use]
    pub fn suppresses_default(&self) -> bool {
        self.grabbed.is_some() || self.session.as_ref().is_some_and(Session::has_mirror)
    }

    // --- events ---

    /// Subscribe to events of `kind`.
    pub fn on(
        &mut self,
        kind: DragEventKind,
        listener: impl FnMut(&DragEvent<T::Node>) + 'static,
    ) -> ListenerId {
        self.events.on(kind, listener)
    }

    /// Remove exactly the listener registered under `id`.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Deliver `event` to the subscribed listeners.
    pub fn emit(&mut self, event: &DragEvent<T::Node>) {
        self.events.emit(event);
    }

    fn fire(&mut self, event: DragEvent<T::Node>) {
        trace!(target: "dragline", kind = %event.kind(), "emit");
        self.events.emit(&event);
    }

    // --- pointer input ---

    /// Feed one normalized pointer event.
    ///
    /// Ignored after [`destroy`](Self::destroy).
    pub fn handle_pointer(&mut self, event: &PointerEvent<T::Node>) -> PointerResponse {
        if self.destroyed {
            return PointerResponse::NONE;
        }
        match event.kind {
            PointerEventKind::Down => self.grab(event),
            PointerEventKind::Move => self.pointer_moved(event),
            PointerEventKind::Up | PointerEventKind::Cancel => {
                self.release(Some(event.position()));
                PointerResponse::NONE
            }
        }
    }

    fn grab(&mut self, event: &PointerEvent<T::Node>) -> PointerResponse {
        self.press.press(event.position());
        if !event.is_primary() {
            return PointerResponse::NONE;
        }
        let Some(target) = event.target else {
            return PointerResponse::NONE;
        };
        let Some(context) = self.can_start(target) else {
            debug!(target: "dragline", node = ?target, "grab rejected");
            return PointerResponse::NONE;
        };
        debug!(
            target: "dragline",
            item = ?context.item,
            source = ?context.source,
            "grabbed"
        );
        self.grabbed = Some(context);

        if event.pointer_type != PointerType::Mouse {
            return PointerResponse::NONE;
        }
        if is_input(&self.tree, target) {
            PointerResponse::FOCUS_TARGET
        } else {
            PointerResponse::PREVENT_DEFAULT
        }
    }

    fn pointer_moved(&mut self, event: &PointerEvent<T::Node>) -> PointerResponse {
        let point = event.position();
        if let Some(grabbed) = self.grabbed {
            if event.buttons.is_empty() {
                debug!(target: "dragline", "button released unobserved");
                self.release(None);
                return PointerResponse::NONE;
            }
            if !self.press.slid_past(self.config.slide_threshold(), point) {
                return PointerResponse::NONE;
            }
            if self.config.ignore_input_text_selection
                && self
                    .tree
                    .element_from_point(point)
                    .is_some_and(|behind| is_input(&self.tree, behind))
            {
                return PointerResponse::NONE;
            }

            self.grabbed = None;
            self.end();
            self.start_session(grabbed);
            self.attach_mirror(point);
            self.drag(point);
            return PointerResponse::PREVENT_DEFAULT;
        }

        if self.session.as_ref().is_some_and(Session::has_mirror) {
            self.drag(point);
            return PointerResponse::PREVENT_DEFAULT;
        }
        PointerResponse::NONE
    }

    // --- grab legality ---

    fn is_container(&self, node: T::Node) -> bool {
        self.containers.contains(node) || self.policy.is_container(&self.tree, node)
    }

    fn can_start(&self, pressed: T::Node) -> Option<GrabContext<T::Node>> {
        if self.session.as_ref().is_some_and(Session::has_mirror) {
            return None;
        }
        if self.is_container(pressed) {
            return None;
        }

        let handle = pressed;
        let mut current = pressed;
        while let Some(parent) = self.tree.parent(current) {
            if self.is_container(parent) {
                break;
            }
            if self.policy.invalid(&self.tree, current, handle) {
                return None;
            }
            current = parent;
        }

        let source = self.tree.parent(current)?;
        if self.policy.invalid(&self.tree, current, handle) {
            return None;
        }
        let sibling = self.tree.next_sibling(current);
        if !self.policy.moves(&self.tree, current, source, handle, sibling) {
            return None;
        }
        Some(GrabContext {
            item: current,
            source,
        })
    }

    /// Whether pressing `item` would start a grab right now.
    #[must_use]
    pub fn can_move(&self, item: T::Node) -> bool {
        self.can_start(item).is_some()
    }

    // --- session start ---

    /// Start dragging `item` programmatically, without a tracking clone.
    ///
    /// Ends any active session first. A later pointer grab and move replaces
    /// this session with a pointer-driven one.
    pub fn start(&mut self, item: T::Node) {
        if let Some(context) = self.can_start(item) {
            self.end();
            self.start_session(context);
        }
    }

    fn start_session(&mut self, context: GrabContext<T::Node>) {
        let GrabContext { item, source } = context;
        let copy = if self
            .policy
            .copies(&self.tree, item, source, self.config.copy)
        {
            let clone = self.tree.deep_clone(item);
            self.fire(DragEvent::Cloned {
                clone,
                original: item,
                kind: CloneKind::Copy,
            });
            Some(clone)
        } else {
            None
        };

        let sibling = self.tree.next_sibling(item);
        self.session = Some(Session::new(item, source, copy, sibling));
        debug!(
            target: "dragline",
            item = ?item,
            source = ?source,
            copy = copy.is_some(),
            "drag started"
        );
        self.fire(DragEvent::Drag { item, source });
    }

    fn attach_mirror(&mut self, point: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let item = session.item;
        let subject = session.subject();
        let rect = self.tree.rect(item);
        session.offset_x = point.x - rect.x;
        session.offset_y = point.y - rect.y;

        self.tree.set_markers(subject, Markers::TRANSIT, true);
        let (handle, clone) = self.mirror.create(&mut self.tree, item);
        if let Some(session) = self.session.as_mut() {
            session.mirror = Some((handle, clone));
        }
        self.fire(DragEvent::Cloned {
            clone,
            original: item,
            kind: CloneKind::Mirror,
        });
    }

    // --- per-sample update ---

    fn drag(&mut self, point: Point) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some((handle, _)) = session.mirror.as_ref() else {
            return;
        };
        self.mirror.move_to(
            &mut self.tree,
            handle,
            point.x - session.offset_x,
            point.y - session.offset_y,
        );
        let behind = self
            .mirror
            .element_behind_pointer(&self.tree, Some(handle), point);
        let subject = session.subject();
        let source = session.source;
        let is_copy = session.copy.is_some();
        let last = session.last_drop_target;
        let initial_sibling = session.initial_sibling;

        let target = self.find_drop_target(behind, point);
        let container = target.map(|t| t.container);
        trace!(
            target: "dragline",
            x = point.x,
            y = point.y,
            container = ?container,
            reference = ?target.and_then(|t| t.reference),
            "sample"
        );

        let changed = container.is_some() && container != last;
        if changed || container.is_none() {
            if let Some(previous) = last {
                self.fire(DragEvent::Out {
                    item: subject,
                    container: previous,
                    source,
                });
                if self.config.remove_on_spill {
                    self.tree.set_markers(subject, Markers::HIDE, true);
                }
            }
            if let Some(session) = self.session.as_mut() {
                session.last_drop_target = container;
            }
            if let Some(entered) = container.filter(|_| changed) {
                self.fire(DragEvent::Over {
                    item: subject,
                    container: entered,
                    source,
                });
                if self.config.remove_on_spill {
                    self.tree.set_markers(subject, Markers::HIDE, false);
                }
            }
        }

        let parent = self.tree.parent(subject);
        if container == Some(source) && is_copy && !self.config.copy_sort_source {
            if parent.is_some() {
                self.tree.detach(subject);
            }
            return;
        }

        let reference = match target {
            Some(DropTarget {
                immediate: Some(_),
                reference,
                ..
            }) => reference,
            _ if self.config.revert_on_spill && !is_copy => initial_sibling,
            _ => {
                if is_copy && parent.is_some() {
                    self.tree.detach(subject);
                }
                return;
            }
        };

        let insert_target = container.unwrap_or(source);
        let in_place = parent == Some(insert_target)
            && (reference == Some(subject) || reference == self.tree.next_sibling(subject));
        if in_place {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.current_sibling = reference;
        }
        self.tree.insert_before(insert_target, subject, reference);
        self.fire(DragEvent::Shadow {
            item: subject,
            container: insert_target,
            source,
        });
    }

    fn find_drop_target(
        &self,
        behind: Option<T::Node>,
        point: Point,
    ) -> Option<DropTarget<T::Node>> {
        let session = self.session.as_ref()?;
        let subject = session.subject();
        resolver::resolve_drop_target(
            &self.tree,
            behind,
            point,
            self.config.direction,
            |node| self.is_container(node),
            |container, reference| {
                self.is_initial_position(Some(container), reference)
                    || self
                        .policy
                        .accepts(&self.tree, subject, container, session.source, reference)
            },
        )
    }

    /// Would the subject sit in `target` before `sibling` exactly where it
    /// started?
    fn is_initial_position(&self, target: Option<T::Node>, sibling: Option<T::Node>) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let subject = session.subject();
        let sibling = if sibling == Some(subject) {
            self.tree.next_sibling(subject)
        } else {
            sibling
        };
        target == Some(session.source) && sibling == session.initial_sibling
    }

    /// [`is_initial_position`](Self::is_initial_position) with the subject's
    /// current sibling.
    fn is_initial_placement(&self, target: Option<T::Node>) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let sibling = if session.has_mirror() {
            session.current_sibling
        } else {
            self.tree.next_sibling(session.subject())
        };
        self.is_initial_position(target, sibling)
    }

    // --- terminal outcomes ---

    fn release(&mut self, point: Option<Point>) {
        let _span = debug_span!("dragline.release").entered();
        self.grabbed = None;
        if self.session.is_none() {
            return;
        }

        let target = point.and_then(|point| {
            self.drag(point);
            let session = self.session.as_ref()?;
            let handle = session.mirror.as_ref().map(|(handle, _)| handle);
            let behind = self.mirror.element_behind_pointer(&self.tree, handle, point);
            self.find_drop_target(behind, point)
        });
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let is_copy = session.copy.is_some();
        let source = session.source;

        match target.map(|t| t.container) {
            Some(container)
                if !is_copy || self.config.copy_sort_source || container != source =>
            {
                self.drop_at(Some(container));
            }
            _ if self.config.remove_on_spill => self.remove(),
            _ => self.cancel(None),
        }
    }

    fn drop_at(&mut self, target: Option<T::Node>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let subject = session.subject();
        let item = session.item;
        let source = session.source;
        let current_sibling = session.current_sibling;
        let is_copy = session.copy.is_some();

        if is_copy
            && self.config.copy_sort_source
            && target == Some(source)
            && self.tree.parent(subject).is_some()
        {
            self.tree.detach(item);
        }

        match target {
            Some(target) if !self.is_initial_placement(Some(target)) => {
                debug!(target: "dragline", item = ?subject, container = ?target, "drop");
                self.fire(DragEvent::Drop {
                    item: subject,
                    target,
                    source,
                    sibling: current_sibling,
                });
            }
            _ => {
                debug!(target: "dragline", item = ?subject, "drop at origin, cancel");
                self.fire(DragEvent::Cancel {
                    item: subject,
                    container: source,
                    source,
                });
            }
        }
        self.cleanup();
    }

    /// Commit the drag where the subject currently sits: `cancel` if that is
    /// its original position, `drop` otherwise. No-op when idle.
    pub fn end(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let parent = self.tree.parent(session.subject());
        self.drop_at(parent);
    }

    /// Take the subject out of the tree and end the drag. No-op when idle.
    ///
    /// Emits `remove`, or `cancel` when the subject was a copy.
    pub fn remove(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let subject = session.subject();
        let source = session.source;
        let is_copy = session.copy.is_some();
        let parent = self.tree.parent(subject);
        if parent.is_some() {
            self.tree.detach(subject);
        }
        let container = parent.unwrap_or(source);
        debug!(target: "dragline", item = ?subject, copy = is_copy, "remove");
        self.fire(if is_copy {
            DragEvent::Cancel {
                item: subject,
                container,
                source,
            }
        } else {
            DragEvent::Remove {
                item: subject,
                container,
                source,
            }
        });
        self.cleanup();
    }

    /// End the drag without committing. No-op when idle.
    ///
    /// `revert` overrides `revert_on_spill`: when reverting, a copy is
    /// discarded and an original goes back before its initial sibling.
    pub fn cancel(&mut self, revert: Option<bool>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let subject = session.subject();
        let item = session.item;
        let source = session.source;
        let initial_sibling = session.initial_sibling;
        let current_sibling = session.current_sibling;
        let copy = session.copy;

        let reverts = revert.unwrap_or(self.config.revert_on_spill);
        let parent = self.tree.parent(subject);
        let initial = self.is_initial_placement(parent);

        if !initial && reverts {
            match copy {
                Some(copy) => self.tree.detach(copy),
                None => self.tree.insert_before(source, item, initial_sibling),
            }
        }

        match parent {
            Some(parent) if !initial && !reverts => {
                debug!(target: "dragline", item = ?subject, container = ?parent, "cancel kept position");
                self.fire(DragEvent::Drop {
                    item: subject,
                    target: parent,
                    source,
                    sibling: current_sibling,
                });
            }
            _ => {
                debug!(target: "dragline", item = ?subject, reverted = reverts, "cancel");
                self.fire(DragEvent::Cancel {
                    item: subject,
                    container: source,
                    source,
                });
            }
        }
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.grabbed = None;
        let subject = session.subject();
        let source = session.source;
        let last = session.last_drop_target;
        let abandoned = session.copy.filter(|copy| self.tree.parent(*copy).is_none());
        if let Some((handle, _)) = session.mirror {
            self.mirror.destroy(&mut self.tree, handle);
        }
        self.tree
            .set_markers(subject, Markers::TRANSIT | Markers::HIDE, false);
        if let Some(container) = last {
            self.fire(DragEvent::Out {
                item: subject,
                container,
                source,
            });
        }
        self.fire(DragEvent::DragEnd { item: subject });
        if let Some(copy) = abandoned {
            self.tree.discard(copy);
        }
    }

    /// Stop reacting to pointer input. A live drag is released as a spill.
    ///
    /// Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let _span = debug_span!("dragline.destroy").entered();
        debug!(target: "dragline", dragging = self.is_dragging(), "destroy");
        self.destroyed = true;
        self.release(None);
        self.press.reset();
    }
}

impl<T, M> fmt::Debug for Drake<T, M>
where
    T: NodeTree + fmt::Debug,
    M: MirrorProvider<T> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drake")
            .field("tree", &self.tree)
            .field("mirror", &self.mirror)
            .field("containers", &self.containers)
            .field("config", &self.config)
            .field("events", &self.events)
            .field("state", &self.state())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
