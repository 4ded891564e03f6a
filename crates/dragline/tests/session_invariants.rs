#![forbid(unsafe_code)]

//! Property invariants for drag sessions.
//!
//! Random streams of pointer samples and public operations run against a
//! two-container board. The host reflows both containers after every step,
//! the way a browser would lay out after a DOM move. After each stream the
//! recorded events must form a well-nested lifecycle and the tree must be
//! free of drag residue, including the storage of discarded clones.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use dragline::core::event::{Buttons, PointerEvent};
use dragline::core::geometry::{Direction, Rect};
use dragline::core::tree::Markers;
use dragline::core::{Document, NodeId};
use dragline::{CloneKind, DragEvent, DragEventKind, DragOptions, DragState, Drake, NodeTree};
use proptest::prelude::*;

const IN_A: usize = 5;
const IN_B: usize = 3;
const ITEMS: usize = IN_A + IN_B;

struct Board {
    a: NodeId,
    b: NodeId,
    items: Vec<NodeId>,
}

/// A at y 0..100 holding five 10px rows, B at y 120..220 holding three.
/// Everything else is spill.
fn board() -> (Document, Board) {
    let mut doc = Document::new();
    let root = doc.root();
    let a = doc.append(root, "A", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let b = doc.append(root, "B", Rect::new(0.0, 120.0, 100.0, 100.0)).unwrap();
    let mut items = Vec::with_capacity(ITEMS);
    for i in 0..IN_A {
        let rect = Rect::new(0.0, i as f64 * 10.0, 100.0, 10.0);
        items.push(doc.append(a, format!("a{i}"), rect).unwrap());
    }
    for i in 0..IN_B {
        let rect = Rect::new(0.0, 120.0 + i as f64 * 10.0, 100.0, 10.0);
        items.push(doc.append(b, format!("b{i}"), rect).unwrap());
    }
    (doc, Board { a, b, items })
}

#[derive(Debug, Clone, Copy)]
struct Setup {
    copy: bool,
    copy_sort_source: bool,
    revert_on_spill: bool,
    remove_on_spill: bool,
}

impl Setup {
    fn options(self) -> DragOptions<Document> {
        DragOptions::new()
            .copy(self.copy)
            .copy_sort_source(self.copy && self.copy_sort_source)
            .revert_on_spill(self.revert_on_spill)
            .remove_on_spill(self.remove_on_spill)
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Down(usize),
    Move(f64, f64),
    Lift(f64, f64),
    Up(f64, f64),
    Start(usize),
    End,
    Cancel(Option<bool>),
    Remove,
}

fn setup() -> impl Strategy<Value = Setup> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(copy, copy_sort_source, revert_on_spill, remove_on_spill)| Setup {
            copy,
            copy_sort_source,
            revert_on_spill,
            remove_on_spill,
        },
    )
}

fn point() -> impl Strategy<Value = (f64, f64)> {
    (-20.0f64..140.0, -20.0f64..260.0)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..ITEMS).prop_map(Op::Down),
        8 => point().prop_map(|(x, y)| Op::Move(x, y)),
        1 => point().prop_map(|(x, y)| Op::Lift(x, y)),
        2 => point().prop_map(|(x, y)| Op::Up(x, y)),
        1 => (0..ITEMS).prop_map(Op::Start),
        1 => Just(Op::End),
        1 => proptest::option::of(any::<bool>()).prop_map(Op::Cancel),
        1 => Just(Op::Remove),
    ]
}

type Log = Rc<RefCell<Vec<DragEvent<NodeId>>>>;

fn record(drake: &mut Drake<Document>) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for kind in DragEventKind::ALL {
        let log = Rc::clone(&log);
        drake.on(kind, move |event| log.borrow_mut().push(*event));
    }
    log
}

fn reflow(drake: &mut Drake<Document>, board: &Board) {
    for container in [board.a, board.b] {
        drake
            .tree_mut()
            .reflow(container, Direction::Vertical)
            .expect("containers exist");
    }
}

fn layout(drake: &Drake<Document>, board: &Board) -> Vec<Vec<NodeId>> {
    [board.a, board.b]
        .into_iter()
        .map(|c| drake.tree().children(c).collect())
        .collect()
}

fn apply(drake: &mut Drake<Document>, board: &Board, op: Op) {
    match op {
        Op::Down(i) => {
            let node = board.items[i];
            let rect = drake.tree().rect(node);
            drake.handle_pointer(&PointerEvent::down(node, rect.center_x(), rect.center_y()));
        }
        Op::Move(x, y) => {
            drake.handle_pointer(&PointerEvent::moved(x, y));
        }
        Op::Lift(x, y) => {
            drake.handle_pointer(&PointerEvent::moved(x, y).with_buttons(Buttons::NONE));
        }
        Op::Up(x, y) => {
            drake.handle_pointer(&PointerEvent::up(x, y));
        }
        Op::Start(i) => drake.start(board.items[i]),
        Op::End => drake.end(),
        Op::Cancel(revert) => drake.cancel(revert),
        Op::Remove => drake.remove(),
    }
    reflow(drake, board);
}

/// Run `ops`, re-sampling every move once more and asserting the repeat is
/// silent.
fn run(setup: Setup, ops: &[Op]) -> (Drake<Document>, Board, Vec<DragEvent<NodeId>>) {
    let (doc, board) = board();
    let mut drake = Drake::with_containers(doc, [board.a, board.b], setup.options());
    let log = record(&mut drake);

    for &op in ops {
        apply(&mut drake, &board, op);
        if let Op::Move(..) = op {
            let seen = log.borrow().len();
            let before = layout(&drake, &board);
            apply(&mut drake, &board, op);
            assert_eq!(log.borrow().len(), seen, "repeat of {op:?} emitted events");
            assert_eq!(layout(&drake, &board), before, "repeat of {op:?} moved nodes");
        }
    }
    let events = log.borrow().clone();
    (drake, board, events)
}

#[derive(Debug, Default)]
struct Lifecycle {
    pending_copy: Option<NodeId>,
    subject: Option<NodeId>,
    hovered: Option<NodeId>,
    terminated: bool,
}

impl Lifecycle {
    fn active(&self, item: NodeId) {
        assert_eq!(self.subject, Some(item), "event for a node that is not the subject");
    }

    fn step(&mut self, event: &DragEvent<NodeId>) {
        match *event {
            DragEvent::Cloned {
                clone,
                kind: CloneKind::Copy,
                ..
            } => {
                assert!(self.subject.is_none() && self.pending_copy.is_none());
                self.pending_copy = Some(clone);
            }
            DragEvent::Drag { item, .. } => {
                assert!(self.subject.is_none(), "drag while a session is live");
                self.subject = Some(self.pending_copy.take().unwrap_or(item));
                self.hovered = None;
                self.terminated = false;
            }
            DragEvent::Cloned {
                kind: CloneKind::Mirror,
                ..
            } => {
                assert!(self.subject.is_some() && !self.terminated);
            }
            DragEvent::Over { item, container, .. } => {
                self.active(item);
                assert!(!self.terminated);
                assert_eq!(self.hovered, None, "over without closing out");
                self.hovered = Some(container);
            }
            DragEvent::Out { item, container, .. } => {
                self.active(item);
                assert_eq!(self.hovered, Some(container), "out without matching over");
                self.hovered = None;
            }
            DragEvent::Shadow { item, .. } => {
                self.active(item);
                assert!(!self.terminated);
            }
            DragEvent::Drop { item, .. }
            | DragEvent::Cancel { item, .. }
            | DragEvent::Remove { item, .. } => {
                self.active(item);
                assert!(!self.terminated, "second terminal event");
                self.terminated = true;
            }
            DragEvent::DragEnd { item } => {
                self.active(item);
                assert!(self.terminated, "dragend without terminal event");
                assert_eq!(self.hovered, None);
                *self = Self::default();
            }
        }
    }
}

fn assert_lifecycle(drake: &Drake<Document>, events: &[DragEvent<NodeId>]) {
    let mut lifecycle = Lifecycle::default();
    for event in events {
        lifecycle.step(event);
    }
    if drake.is_dragging() {
        assert!(lifecycle.subject.is_some() && !lifecycle.terminated);
    } else {
        assert!(lifecycle.subject.is_none() && lifecycle.pending_copy.is_none());
    }
}

fn assert_no_residue(drake: &Drake<Document>, board: &Board) {
    if drake.is_dragging() {
        return;
    }
    let tree = drake.tree();
    assert_eq!(
        tree.children(tree.root()).collect::<Vec<_>>(),
        vec![board.a, board.b],
        "tracking clone left behind"
    );
    assert_eq!(tree.markers(tree.root()), Markers::NONE);
    for container in [board.a, board.b] {
        for node in tree.children(container) {
            assert_eq!(tree.markers(node), Markers::NONE, "marker left on {node:?}");
        }
    }
    for &item in &board.items {
        assert_eq!(tree.markers(item), Markers::NONE);
    }
    let originals: HashSet<_> = board.items.iter().copied().collect();
    let placed_copies = [board.a, board.b]
        .into_iter()
        .flat_map(move |c| tree.children(c))
        .filter(|n| !originals.contains(n))
        .count();
    assert_eq!(
        tree.len(),
        3 + ITEMS + placed_copies,
        "clones outlived their drag"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn random_streams_keep_lifecycle_well_nested(
        setup in setup(),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let (drake, board, events) = run(setup, &ops);
        assert_lifecycle(&drake, &events);
        assert_no_residue(&drake, &board);
    }

    #[test]
    fn items_only_live_in_containers_or_nowhere(
        setup in setup(),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let (drake, board, _) = run(setup, &ops);
        let tree = drake.tree();
        let mut seen = HashSet::new();
        for container in [board.a, board.b] {
            for node in tree.children(container) {
                prop_assert!(seen.insert(node), "{:?} listed twice", node);
            }
        }
        for &item in &board.items {
            let parent = tree.parent(item);
            prop_assert!(
                parent.is_none() || parent == Some(board.a) || parent == Some(board.b),
                "{:?} escaped to {:?}", item, parent
            );
        }
    }

    #[test]
    fn copies_never_move_originals(
        mut setup in setup(),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        setup.copy = true;
        setup.copy_sort_source = false;
        let (drake, board, _) = run(setup, &ops);
        let originals: HashSet<_> = board.items.iter().copied().collect();
        let kept: Vec<Vec<NodeId>> = layout(&drake, &board)
            .into_iter()
            .map(|children| children.into_iter().filter(|n| originals.contains(n)).collect())
            .collect();
        prop_assert_eq!(kept, vec![board.items[..IN_A].to_vec(), board.items[IN_A..].to_vec()]);
    }

    #[test]
    fn blocked_items_never_drag(
        setup in setup(),
        blocked_mask in 0u16..(1 << ITEMS),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let (doc, board) = board();
        let blocked: HashSet<NodeId> = board
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| blocked_mask & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();
        let options = setup.options().moves({
            let blocked = blocked.clone();
            move |_, item, _, _, _| !blocked.contains(&item)
        });
        let mut drake = Drake::with_containers(doc, [board.a, board.b], options);
        let log = record(&mut drake);

        for &op in &ops {
            apply(&mut drake, &board, op);
        }
        for event in log.borrow().iter() {
            if let DragEvent::Drag { item, .. } = event {
                prop_assert!(!blocked.contains(item), "{:?} dragged", item);
            }
        }
        for &item in &blocked {
            prop_assert!(!drake.can_move(item));
        }
    }

    #[test]
    fn slack_inside_threshold_never_confirms(
        fx in 1.0f64..20.0,
        fy in 1.0f64..20.0,
        item in 0..ITEMS,
        jitter in proptest::collection::vec((-0.9f64..=0.9, -0.9f64..=0.9), 1..20),
    ) {
        let (doc, board) = board();
        let options = DragOptions::new().slide_factors(fx, fy);
        let mut drake = Drake::with_containers(doc, [board.a, board.b], options);
        let log = record(&mut drake);

        let node = board.items[item];
        let rect = drake.tree().rect(node);
        let (ox, oy) = (rect.center_x(), rect.center_y());
        drake.handle_pointer(&PointerEvent::down(node, ox, oy));
        for (jx, jy) in jitter {
            drake.handle_pointer(&PointerEvent::moved(ox + jx * fx, oy + jy * fy));
            prop_assert_eq!(drake.state(), DragState::Grabbed);
        }
        prop_assert!(log.borrow().is_empty());

        drake.handle_pointer(&PointerEvent::moved(ox + fx + 1.0, oy));
        prop_assert_eq!(drake.state(), DragState::Dragging);
    }

    #[test]
    fn return_to_origin_always_cancels(
        item in 0..IN_A,
        revert in any::<bool>(),
        path in proptest::collection::vec(point(), 0..20),
    ) {
        let (doc, board) = board();
        let options = DragOptions::new()
            .revert_on_spill(revert)
            .accepts(|_, _, _, _, _| false);
        let mut drake = Drake::with_containers(doc, [board.a, board.b], options);
        let log = record(&mut drake);
        let before = layout(&drake, &board);

        let node = board.items[item];
        let rect = drake.tree().rect(node);
        let origin = (rect.center_x(), rect.center_y());
        drake.handle_pointer(&PointerEvent::down(node, origin.0, origin.1));
        drake.handle_pointer(&PointerEvent::moved(origin.0 + 50.0, 240.0));
        for (x, y) in path {
            apply(&mut drake, &board, Op::Move(x, y));
        }
        apply(&mut drake, &board, Op::Move(origin.0, origin.1));
        apply(&mut drake, &board, Op::Up(origin.0, origin.1));

        let events = log.borrow();
        let terminal = events
            .iter()
            .find(|e| matches!(e.kind(), DragEventKind::Drop | DragEventKind::Cancel | DragEventKind::Remove));
        prop_assert_eq!(
            terminal.copied(),
            Some(DragEvent::Cancel { item: node, container: board.a, source: board.a })
        );
        prop_assert_eq!(layout(&drake, &board), before);
    }
}
