#![no_main]

use arbitrary::Arbitrary;
use dragline::{DragOptions, Drake, NodeTree};
use dragline_core::event::{Buttons, Modifiers, PointerButton, PointerEvent, PointerType};
use dragline_core::geometry::{Direction, Rect};
use dragline_core::tree::Markers;
use dragline_core::{Document, NodeId};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    copy: bool,
    copy_sort_source: bool,
    revert_on_spill: bool,
    remove_on_spill: bool,
    horizontal: bool,
    slide: u8,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Down { node: u8, x: u8, y: u8, secondary: bool, ctrl: bool, touch: bool },
    Move { x: u8, y: u8, lifted: bool },
    Up { x: u8, y: u8 },
    Cancel { x: u8, y: u8 },
    Start(u8),
    End,
    Revert(Option<bool>),
    Remove,
    HostMove { node: u8, parent: u8 },
}

fuzz_target!(|input: Input| {
    // Three containers of four items each, side by side, 64 units apart.
    let mut doc = Document::new();
    let root = doc.root();
    let mut containers = Vec::new();
    let mut nodes: Vec<NodeId> = Vec::new();
    for c in 0..3u8 {
        let x = f64::from(c) * 64.0;
        let container = doc
            .append(root, format!("c{c}"), Rect::new(x, 0.0, 60.0, 200.0))
            .expect("root exists");
        for i in 0..4u8 {
            let rect = Rect::new(x, f64::from(i) * 12.0, 60.0, 12.0);
            nodes.push(doc.append(container, format!("c{c}i{i}"), rect).expect("container exists"));
        }
        containers.push(container);
    }
    let direction = if input.horizontal { Direction::Horizontal } else { Direction::Vertical };
    let slide = f64::from(input.slide % 16);

    let options = DragOptions::new()
        .copy(input.copy)
        .copy_sort_source(input.copy_sort_source)
        .revert_on_spill(input.revert_on_spill)
        .remove_on_spill(input.remove_on_spill)
        .direction(direction)
        .slide_factors(slide, slide);
    let mut drake = Drake::with_containers(doc, containers.clone(), options);

    let point = |x: u8, y: u8| (f64::from(x), f64::from(y));
    for op in input.ops.iter().take(256) {
        match *op {
            Op::Down { node, x, y, secondary, ctrl, touch } => {
                let target = nodes[usize::from(node) % nodes.len()];
                let (x, y) = point(x, y);
                let mut event = PointerEvent::down(target, x, y);
                if secondary {
                    event = event.with_button(PointerButton::Secondary);
                }
                if ctrl {
                    event = event.with_modifiers(Modifiers::CTRL);
                }
                if touch {
                    event = event.with_pointer_type(PointerType::Touch);
                }
                drake.handle_pointer(&event);
            }
            Op::Move { x, y, lifted } => {
                let (x, y) = point(x, y);
                let mut event = PointerEvent::moved(x, y);
                if lifted {
                    event = event.with_buttons(Buttons::NONE);
                }
                drake.handle_pointer(&event);
            }
            Op::Up { x, y } => {
                let (x, y) = point(x, y);
                drake.handle_pointer(&PointerEvent::up(x, y));
            }
            Op::Cancel { x, y } => {
                let (x, y) = point(x, y);
                drake.handle_pointer(&PointerEvent::cancel(x, y));
            }
            Op::Start(node) => drake.start(nodes[usize::from(node) % nodes.len()]),
            Op::End => drake.end(),
            Op::Revert(revert) => drake.cancel(revert),
            Op::Remove => drake.remove(),
            Op::HostMove { node, parent } => {
                let node = nodes[usize::from(node) % nodes.len()];
                let parent = containers[usize::from(parent) % containers.len()];
                drake.tree_mut().insert_before(parent, node, None);
            }
        }
        for &container in &containers {
            let _ = drake.tree_mut().reflow(container, direction);
        }
    }

    let tree = drake.into_tree();

    // Post-conditions that must always hold once the controller is gone:
    assert_eq!(
        tree.children(root).collect::<Vec<_>>(),
        containers,
        "tracking clone survived destroy"
    );
    assert_eq!(tree.markers(root), Markers::NONE, "root left unselectable");
    for &container in &containers {
        for child in tree.children(container) {
            assert_eq!(tree.markers(child), Markers::NONE, "drag marker left behind");
        }
    }
    let placed_copies = containers
        .iter()
        .flat_map(|&c| tree.children(c))
        .filter(|n| !nodes.contains(n))
        .count();
    assert_eq!(
        tree.len(),
        1 + containers.len() + nodes.len() + placed_copies,
        "clone storage outlived its drag"
    );
    for &node in &nodes {
        let parent = tree.parent(node);
        assert!(
            parent.is_none() || parent.is_some_and(|p| containers.contains(&p)),
            "item escaped its containers"
        );
    }
});
