//! Content slot substitution.

use horizon_splice_core::{Document, NodeId};

/// Replace every `@<slot>` marker under `generated` with copies of the
/// invocation's children, or drop the markers when it has none.
///
/// Returns the number of markers replaced.
pub fn fill_slots(doc: &mut Document, generated: NodeId, invocation: NodeId, slot: &str) -> usize {
    let markers = doc.at_rules_named(generated, slot);
    let content = doc.children(invocation).to_vec();

    for &marker in &markers {
        for &child in &content {
            if let Some(copy) = doc.deep_clone(child) {
                doc.insert_before(marker, copy);
            }
        }
        doc.remove(marker);
    }
    markers.len()
}
