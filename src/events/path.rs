//! Propagation path construction

use crate::layout::{LayoutTree, NodeId};

/// Build the root→target chain used for capture and bubble traversal
///
/// The path is recomputed for every dispatch since an earlier dispatch may have
/// triggered a new layout. An id the tree does not know yields an empty path.
pub fn build_path(tree: &LayoutTree, target: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    if tree.get(target).is_none() {
        return path;
    }

    let mut current = Some(target);
    while let Some(id) = current {
        path.push(id);
        // Arena parents are always created before their children, so a
        // parent index at or above the child's would mean a corrupt snapshot.
        current = tree.parent_of(id).filter(|parent| parent.0 < id.0);
    }

    path.reverse();
    path
}
