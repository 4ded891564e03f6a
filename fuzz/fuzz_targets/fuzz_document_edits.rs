#![no_main]

use dragline_core::geometry::{Point, Rect};
use dragline_core::tree::{Markers, NodeTree};
use dragline_core::{Document, NodeId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte sizes the node pool (2..34), the rest are 3-byte edits.
    if data.is_empty() {
        return;
    }
    let pool = usize::from(data[0] % 32) + 2;
    let mut doc = Document::new();
    let root = doc.root();
    let mut nodes: Vec<NodeId> = vec![root];
    for i in 0..pool {
        let rect = Rect::new((i * 3) as f64, (i * 5) as f64, 30.0, 20.0);
        nodes.push(doc.append(root, format!("n{i}"), rect).expect("root exists"));
    }

    for chunk in data[1..].chunks_exact(3) {
        let pick = |b: u8| nodes[usize::from(b) % nodes.len()];
        let (a, b) = (pick(chunk[1]), pick(chunk[2]));
        match chunk[0] % 7 {
            0 => {
                let _ = doc.try_insert_before(a, b, None);
            }
            1 => {
                let reference = doc.first_child(a);
                let _ = doc.try_insert_before(a, b, reference);
            }
            2 => doc.detach(b),
            3 => {
                let clone = doc.deep_clone(b);
                nodes.push(clone);
            }
            4 => doc.set_markers(b, Markers::MIRROR, chunk[1] & 1 == 1),
            5 => {
                let live = doc.len();
                doc.discard(b);
                if b != root && live != doc.len() {
                    assert!(!doc.contains(b), "discarded node still live");
                    assert!(!doc.children(root).any(|c| c == b), "discarded node still linked");
                }
            }
            _ => {
                let hit = doc
                    .element_from_point(Point::new(f64::from(chunk[1]), f64::from(chunk[2])))
                    .expect("root always matches");
                assert!(doc.is_attached(hit), "hit a detached node");
            }
        }
    }

    // Post-conditions that must always hold:
    assert_eq!(doc.parent(root), None, "root gained a parent");
    assert!(doc.len() <= doc.capacity(), "live count exceeds slots");
    for &node in &nodes {
        for child in doc.children(node) {
            assert_eq!(doc.parent(child), Some(node), "child/parent links disagree");
        }
        let mut depth = 0;
        let mut current = doc.parent(node);
        while let Some(p) = current {
            depth += 1;
            assert!(depth <= doc.len(), "ancestry cycle");
            current = doc.parent(p);
        }
    }
});
