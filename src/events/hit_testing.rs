//! Hit testing functionality for layout-aware event handling
//!
//! This module finds which node sits under a screen point. Paint order decides
//! occlusion: whatever was painted last is on top, so both variants search
//! from the most recently painted candidate backwards.
//!
//! - [`HitTester::hit_test_boxes`] walks a flat, paint-ordered box list.
//! - [`HitTester::hit_test_tree`] walks the node tree, children last to first.

use std::fmt;
use std::time::Instant;

use crate::layout::{LayoutBox, LayoutTree, NodeId, Point};

/// Outcome of a single hit test
///
/// A miss leaves every field zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitTestResult {
    /// The topmost node containing the point
    pub node: Option<NodeId>,
    /// Point translated into the hit node's coordinate space
    pub local: Point,
    /// Width of the hit node
    pub width: i32,
    /// Height of the hit node
    pub height: i32,
}

impl HitTestResult {
    pub fn found(&self) -> bool {
        self.node.is_some()
    }
}

/// Hit testing engine for determining event targets from layout
#[derive(Debug, Default)]
pub struct HitTester {
    /// Performance statistics
    pub stats: HitTestStats,
}

/// Performance statistics for hit testing
#[derive(Debug, Default, Clone)]
pub struct HitTestStats {
    /// Number of hit tests performed
    pub hit_tests: u64,
    /// Time spent in hit testing (microseconds)
    pub hit_test_time_us: u64,
    /// Number of candidates tested in the last hit test
    pub nodes_tested: u32,
    /// Number of hits found in the last hit test
    pub hits_found: u32,
}

impl HitTester {
    /// Create a new hit tester
    pub fn new() -> Self {
        Self {
            stats: HitTestStats::default(),
        }
    }

    /// Find the topmost box containing `point`
    ///
    /// Boxes are searched from the highest index down; zero-size boxes have not
    /// been laid out yet and are skipped.
    pub fn hit_test_boxes(&mut self, point: Point, boxes: &[LayoutBox]) -> HitTestResult {
        let start_time = Instant::now();
        self.stats.nodes_tested = 0;

        let mut result = HitTestResult::default();
        for layout_box in boxes.iter().rev() {
            self.stats.nodes_tested += 1;
            if layout_box.rect.is_empty() {
                continue;
            }
            if layout_box.rect.contains_point(point) {
                result = HitTestResult {
                    node: Some(layout_box.node),
                    local: point.relative_to(layout_box.rect.origin),
                    width: layout_box.rect.width(),
                    height: layout_box.rect.height(),
                };
                break;
            }
        }

        self.record(start_time, u32::from(result.found()));
        result
    }

    /// Find the deepest, topmost node containing `point` by walking the tree
    pub fn hit_test_tree(&mut self, tree: &LayoutTree, point: Point) -> HitTestResult {
        let start_time = Instant::now();
        self.stats.nodes_tested = 0;

        let result = match tree.root() {
            Some(root) => self
                .hit_test_recursive(tree, root, point)
                .and_then(|id| tree.get(id))
                .map(|node| HitTestResult {
                    node: Some(node.id),
                    local: point.relative_to(node.position()),
                    width: node.rect.width(),
                    height: node.rect.height(),
                })
                .unwrap_or_default(),
            None => HitTestResult::default(),
        };

        self.record(start_time, u32::from(result.found()));
        result
    }

    /// Recursive hit testing implementation
    fn hit_test_recursive(
        &mut self,
        tree: &LayoutTree,
        id: NodeId,
        point: Point,
    ) -> Option<NodeId> {
        self.stats.nodes_tested += 1;
        let node = tree.get(id)?;

        if node.rect.is_empty() || !node.rect.contains_point(point) {
            return None;
        }

        // Later children are painted over earlier ones
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test_recursive(tree, child, point) {
                return Some(hit);
            }
        }

        Some(id)
    }

    /// Find every node containing `point`, topmost first
    pub fn hit_test_all(&mut self, point: Point, boxes: &[LayoutBox]) -> Vec<NodeId> {
        let start_time = Instant::now();
        self.stats.nodes_tested = 0;

        let mut hits = Vec::new();
        for layout_box in boxes.iter().rev() {
            self.stats.nodes_tested += 1;
            if !layout_box.rect.is_empty() && layout_box.rect.contains_point(point) {
                hits.push(layout_box.node);
            }
        }

        self.record(start_time, u32::try_from(hits.len()).unwrap_or(u32::MAX));
        hits
    }

    fn record(&mut self, start_time: Instant, hits_found: u32) {
        let elapsed = start_time.elapsed();
        self.stats.hit_tests += 1;
        // At least 1us per test so totals stay non-zero
        let elapsed_us = std::cmp::max(1, u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
        self.stats.hit_test_time_us = self.stats.hit_test_time_us.saturating_add(elapsed_us);
        self.stats.hits_found = hits_found;
    }

    /// Reset hit testing statistics
    pub fn reset_stats(&mut self) {
        self.stats = HitTestStats::default();
    }

    /// Get hit testing statistics
    pub fn get_stats(&self) -> &HitTestStats {
        &self.stats
    }
}

/// Hit-test a paint-ordered box list without keeping statistics
pub fn hit_test(point: Point, boxes: &[LayoutBox]) -> HitTestResult {
    HitTester::new().hit_test_boxes(point, boxes)
}

/// Hit-test a node tree without keeping statistics
pub fn hit_test_tree(tree: &LayoutTree, point: Point) -> HitTestResult {
    HitTester::new().hit_test_tree(tree, point)
}

impl fmt::Display for HitTestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hit Test Stats: {} tests, {}us total time, {} nodes tested, {} hits found",
            self.hit_tests, self.hit_test_time_us, self.nodes_tested, self.hits_found
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    fn create_test_layout() -> (LayoutTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 80, 24));
        // Left half
        let left = tree.add_child(root, Rect::new(0, 0, 40, 12)).unwrap();
        // Bottom-right quadrant
        let right = tree.add_child(root, Rect::new(40, 12, 40, 12)).unwrap();
        // Nested inside the left half
        let nested = tree.add_child(left, Rect::new(10, 5, 20, 4)).unwrap();
        (tree, root, left, right, nested)
    }

    #[test]
    fn test_hit_tester_creation() {
        let hit_tester = HitTester::new();
        assert_eq!(hit_tester.stats.hit_tests, 0);
        assert_eq!(hit_tester.stats.nodes_tested, 0);
    }

    #[test]
    fn test_box_hit_reports_local_coordinates() {
        let boxes = vec![
            LayoutBox::new(NodeId(0), Rect::new(0, 0, 80, 24)),
            LayoutBox::new(NodeId(1), Rect::new(10, 10, 20, 20)),
        ];
        let result = hit_test(Point::new(15, 17), &boxes);

        assert!(result.found());
        assert_eq!(result.node, Some(NodeId(1)));
        assert_eq!(result.local, Point::new(5, 7));
        assert_eq!((result.width, result.height), (20, 20));
    }

    #[test]
    fn test_overlapping_boxes_highest_index_wins() {
        let mut boxes = vec![
            LayoutBox::new(NodeId(0), Rect::new(0, 0, 10, 10)),
            LayoutBox::new(NodeId(1), Rect::new(2, 2, 10, 10)),
            LayoutBox::new(NodeId(2), Rect::new(4, 4, 10, 10)),
        ];
        let point = Point::new(5, 5);
        assert_eq!(hit_test(point, &boxes).node, Some(NodeId(2)));

        boxes.pop();
        assert_eq!(hit_test(point, &boxes).node, Some(NodeId(1)));
    }

    #[test]
    fn test_zero_size_boxes_are_skipped() {
        let boxes = vec![
            LayoutBox::new(NodeId(0), Rect::new(0, 0, 10, 10)),
            LayoutBox::new(NodeId(1), Rect::new(0, 0, 0, 10)),
        ];
        assert_eq!(hit_test(Point::new(0, 0), &boxes).node, Some(NodeId(0)));
    }

    #[test]
    fn test_hit_test_miss_is_zeroed() {
        let boxes = vec![LayoutBox::new(NodeId(0), Rect::new(0, 0, 10, 10))];
        let result = hit_test(Point::new(50, 50), &boxes);
        assert!(!result.found());
        assert_eq!(result, HitTestResult::default());
    }

    #[test]
    fn test_tree_hit_nested() {
        let (tree, _, _, _, nested) = create_test_layout();
        let result = hit_test_tree(&tree, Point::new(15, 6));
        assert_eq!(result.node, Some(nested));
        assert_eq!(result.local, Point::new(5, 1));
    }

    #[test]
    fn test_tree_hit_falls_back_to_container() {
        let (tree, root, left, _, _) = create_test_layout();
        assert_eq!(hit_test_tree(&tree, Point::new(2, 2)).node, Some(left));
        assert_eq!(hit_test_tree(&tree, Point::new(60, 2)).node, Some(root));
        assert!(!hit_test_tree(&tree, Point::new(100, 100)).found());
    }

    #[test]
    fn test_tree_later_sibling_wins() {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 20, 20));
        let _under = tree.add_child(root, Rect::new(0, 0, 10, 10)).unwrap();
        let over = tree.add_child(root, Rect::new(5, 5, 10, 10)).unwrap();
        assert_eq!(hit_test_tree(&tree, Point::new(6, 6)).node, Some(over));
    }

    #[test]
    fn test_tree_skips_zero_size_nodes() {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 20, 20));
        let visible = tree.add_child(root, Rect::new(0, 0, 10, 10)).unwrap();
        let _collapsed = tree.add_child(root, Rect::new(0, 0, 0, 10)).unwrap();
        let _flat = tree.add_child(root, Rect::new(0, 0, 10, 0)).unwrap();
        assert_eq!(hit_test_tree(&tree, Point::new(0, 0)).node, Some(visible));

        let mut tree = LayoutTree::new();
        let empty_root = tree.add_root(Rect::new(0, 0, 0, 0));
        let _child = tree.add_child(empty_root, Rect::new(0, 0, 5, 5)).unwrap();
        assert!(!hit_test_tree(&tree, Point::new(0, 0)).found());
    }

    #[test]
    fn test_tree_and_box_variants_agree() {
        let (tree, ..) = create_test_layout();
        let boxes = tree.boxes();
        let points = [
            Point::new(15, 6),
            Point::new(2, 2),
            Point::new(50, 20),
            Point::new(79, 0),
        ];
        for point in points {
            assert_eq!(hit_test_tree(&tree, point), hit_test(point, &boxes));
        }
    }

    #[test]
    fn test_hit_test_all_topmost_first() {
        let (tree, root, left, _, nested) = create_test_layout();
        let mut hit_tester = HitTester::new();
        let hits = hit_tester.hit_test_all(Point::new(15, 6), &tree.boxes());
        assert_eq!(hits, vec![nested, left, root]);
    }

    #[test]
    fn test_hit_test_statistics() {
        let (tree, ..) = create_test_layout();
        let mut hit_tester = HitTester::new();
        hit_tester.hit_test_all(Point::new(15, 6), &tree.boxes());

        assert_eq!(hit_tester.stats.hit_tests, 1);
        assert!(hit_tester.stats.nodes_tested > 0);
        assert!(hit_tester.stats.hit_test_time_us > 0);
        assert_eq!(hit_tester.stats.hits_found, 3);

        let stats_str = format!("{}", hit_tester.stats);
        assert!(stats_str.contains("1 tests"));
        assert!(stats_str.contains("3 hits found"));

        hit_tester.reset_stats();
        assert_eq!(hit_tester.get_stats().hit_tests, 0);
    }
}
