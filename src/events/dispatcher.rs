//! Three-phase event dispatcher
//!
//! The dispatcher routes one event at a time through the layout snapshot:
//!
//! 1. Hit-test the pointer position to find the target node.
//! 2. Build the root→target propagation path.
//! 3. Capture: deliver to each ancestor from the root down.
//! 4. Target: deliver to the hit node with node-local coordinates.
//! 5. Bubble: deliver to each ancestor from the target's parent back up.
//!
//! Handlers cancel cooperatively through the event's propagation flags, which
//! are checked between delivery steps. Focus is never changed here; a focus
//! request is reported in the [`EventResult`] for the focus manager to apply.

use crate::config::DispatcherConfig;
use crate::events::event::{Event, EventPayload};
use crate::events::hit_testing::{HitTestResult, HitTestStats, HitTester};
use crate::events::path::build_path;
use crate::events::result::{EventResult, FocusChange};
use crate::events::types::{EventPhase, EventType, KeyAction, KeyEvent, MouseEvent};
use crate::layout::{LayoutBox, LayoutTree, NodeId, Point};

/// Where the dispatcher is inside the processing of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Routes events to the components of a layout snapshot
#[derive(Debug, Default)]
pub struct Dispatcher {
    config: DispatcherConfig,
    hit_tester: HitTester,
    state: DispatchState,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher with an explicit configuration
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Current state
    ///
    /// Dispatch borrows the dispatcher mutably, so callers only ever observe
    /// `Idle`; this doubles as a check that no dispatch was left half-way. The
    /// intermediate states show up in the per-delivery trace log.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Hit testing statistics accumulated by this dispatcher
    pub fn hit_stats(&self) -> &HitTestStats {
        self.hit_tester.get_stats()
    }

    /// Dispatch an event, hit-testing pointer input against a paint-ordered box list
    pub fn dispatch(
        &mut self,
        tree: &LayoutTree,
        boxes: &[LayoutBox],
        event: &mut Event,
    ) -> EventResult {
        match event.mouse_event().map(MouseEvent::position) {
            Some(point) => {
                let hit = self.hit_tester.hit_test_boxes(point, boxes);
                self.dispatch_hit(tree, hit, event)
            }
            None => self.dispatch_unpositioned(event),
        }
    }

    /// Dispatch an event, hit-testing pointer input by walking the node tree
    pub fn dispatch_tree(&mut self, tree: &LayoutTree, event: &mut Event) -> EventResult {
        match event.mouse_event().map(MouseEvent::position) {
            Some(point) => {
                let hit = self.hit_tester.hit_test_tree(tree, point);
                self.dispatch_hit(tree, hit, event)
            }
            None => self.dispatch_unpositioned(event),
        }
    }

    /// Run the three phases towards a caller-chosen node
    ///
    /// Used to route key input to the node the focus manager reports as
    /// focused. No hit test and no Tab handling take place.
    pub fn dispatch_to(
        &mut self,
        tree: &LayoutTree,
        target: NodeId,
        event: &mut Event,
    ) -> EventResult {
        let Some(node) = tree.get(target) else {
            log::debug!("dispatch target {target} is not in the layout tree");
            return EventResult::unhandled();
        };
        let local = event
            .mouse_event()
            .map(|mouse| mouse.position().relative_to(node.position()))
            .unwrap_or_default();
        let path = build_path(tree, target);
        self.propagate(tree, &path, local, event)
    }

    fn dispatch_hit(
        &mut self,
        tree: &LayoutTree,
        hit: HitTestResult,
        event: &mut Event,
    ) -> EventResult {
        let Some(target) = hit.node else {
            log::debug!("{} missed every node", event.event_type());
            return EventResult::unhandled();
        };

        let path = build_path(tree, target);
        if path.is_empty() {
            log::debug!("hit node {target} has no propagation path");
            return EventResult::unhandled();
        }

        self.propagate(tree, &path, hit.local, event)
    }

    fn dispatch_unpositioned(&self, event: &Event) -> EventResult {
        if event.event_type() == EventType::RESIZE {
            // A signal to the layout engine, never routed to components
            return EventResult::handled();
        }

        match event.key_event() {
            Some(key) => self.route_key(key),
            None => EventResult::unhandled(),
        }
    }

    fn route_key(&self, key: &KeyEvent) -> EventResult {
        if !self.config.tab_navigation || key.action == KeyAction::Release {
            return EventResult::unhandled();
        }
        if key.is_back_tab() {
            EventResult::focus(FocusChange::Prev)
        } else if key.is_tab() {
            EventResult::focus(FocusChange::Next)
        } else {
            EventResult::unhandled()
        }
    }

    fn propagate(
        &mut self,
        tree: &LayoutTree,
        path: &[NodeId],
        target_local: Point,
        event: &mut Event,
    ) -> EventResult {
        let Some((&target, ancestors)) = path.split_last() else {
            return EventResult::unhandled();
        };

        let mut result = EventResult::unhandled();
        event.begin(target);

        self.state = DispatchState::Capturing;
        for &node in ancestors {
            let local = self.local_point(tree, node, event);
            event.enter(EventPhase::Capture, node, local);
            result.merge(self.deliver(tree, node, event));
            if event.is_propagation_stopped() {
                log::debug!("propagation stopped during capture at {node}");
                return self.finish(event, result);
            }
        }

        self.state = DispatchState::AtTarget;
        event.enter(EventPhase::Target, target, target_local);
        let delivered = self.deliver(tree, target, event);
        result.merge(delivered);
        if let Some(node) = self.focus_request(tree, target, event, delivered.handled) {
            result.merge(EventResult::focus_node(node));
        }
        if event.is_propagation_stopped() {
            log::debug!("propagation stopped at target {target}");
            return self.finish(event, result);
        }

        self.state = DispatchState::Bubbling;
        for &node in ancestors.iter().rev() {
            let local = self.local_point(tree, node, event);
            event.enter(EventPhase::Bubble, node, local);
            result.merge(self.deliver(tree, node, event));
            if event.is_propagation_stopped() {
                log::debug!("propagation stopped during bubble at {node}");
                break;
            }
        }

        self.finish(event, result)
    }

    fn finish(&mut self, event: &mut Event, result: EventResult) -> EventResult {
        event.finish();
        self.state = DispatchState::Idle;
        result
    }

    /// Pointer position relative to `node`; zero for events without a position
    fn local_point(&self, tree: &LayoutTree, node: NodeId, event: &Event) -> Point {
        match (event.mouse_event(), tree.get(node)) {
            (Some(mouse), Some(node)) => mouse.position().relative_to(node.position()),
            _ => Point::zero(),
        }
    }

    /// A handled primary press on a focusable target asks the focus manager to focus it
    fn focus_request(
        &self,
        tree: &LayoutTree,
        target: NodeId,
        event: &Event,
        handled: bool,
    ) -> Option<NodeId> {
        if !self.config.focus_on_press || !handled {
            return None;
        }
        let press = event.mouse_event().is_some_and(|mouse| mouse.is_primary_press());
        let focusable = tree.get(target).is_some_and(|node| node.is_focusable());
        (press && focusable).then_some(target)
    }

    /// Attempt delivery of the event to a single node
    ///
    /// Delegated handlers run first in every phase. The component's direct
    /// mouse/key capability is the fallback and only runs at the target and
    /// while bubbling.
    fn deliver(&self, tree: &LayoutTree, node: NodeId, event: &mut Event) -> EventResult {
        let Some(component) = tree.get(node).and_then(|n| n.component.as_ref()) else {
            return EventResult::unhandled();
        };
        log::trace!(
            "{:?}: {} {} -> {} ({})",
            self.state,
            event.event_type(),
            event.phase(),
            node,
            component.name()
        );

        let mut result = EventResult::unhandled();
        if let Some(delegator) = component.delegator() {
            result = delegator.handle_event(event);
            if result.handled || event.is_immediate_propagation_stopped() {
                return result;
            }
        }

        if event.phase() == EventPhase::Capture {
            return result;
        }

        let handled = match *event.payload() {
            EventPayload::Mouse(mouse) => component
                .mouse_handler()
                .is_some_and(|handler| handler.handle_mouse(&mouse.at(event.local_position()))),
            EventPayload::Key(key) => component
                .key_handler()
                .is_some_and(|handler| handler.handle_key(&key)),
            _ => false,
        };
        if handled {
            result.merge(EventResult::handled());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::events::delegation::EventDelegator;
    use crate::events::types::{Key, Modifiers, MouseAction, MouseButton};
    use crate::layout::Rect;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    type Trace = Arc<Mutex<Vec<(EventPhase, NodeId)>>>;

    /// root (0,0 80x24) -> parent (5,5 40x20) -> target (10,10 20x20)
    fn three_level_tree() -> (LayoutTree, NodeId, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 80, 24));
        let parent = tree.add_child(root, Rect::new(5, 5, 40, 20)).unwrap();
        let target = tree.add_child(parent, Rect::new(10, 10, 20, 20)).unwrap();
        (tree, root, parent, target)
    }

    fn trace_component(trace: &Trace, name: &str, result: EventResult) -> Component {
        let delegator = EventDelegator::new();
        let trace = trace.clone();
        delegator
            .on(EventType::MOUSE_PRESS, move |event: &mut Event| {
                if let Some(node) = event.current_target() {
                    trace.lock().unwrap().push((event.phase(), node));
                }
                result
            })
            .unwrap();
        Component::new(name).with_delegator(Arc::new(delegator))
    }

    fn bind_traces(tree: &mut LayoutTree, nodes: &[NodeId], trace: &Trace) {
        for &node in nodes {
            tree.bind(node, trace_component(trace, "traced", EventResult::unhandled()))
                .unwrap();
        }
    }

    /// Focusable component whose mouse handler consumes primary presses when `accept` is set
    fn focusable_input(accept: bool) -> Component {
        Component::new("input")
            .with_mouse(move |mouse: &MouseEvent| accept && mouse.is_primary_press())
            .focusable(true)
    }

    #[test]
    fn test_full_capture_target_bubble_order() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root, parent, target], &trace);

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                (EventPhase::Capture, root),
                (EventPhase::Capture, parent),
                (EventPhase::Target, target),
                (EventPhase::Bubble, parent),
                (EventPhase::Bubble, root),
            ]
        );
        assert_eq!(event.phase(), EventPhase::None);
        assert_eq!(event.current_target(), None);
        assert_eq!(event.target(), Some(target));
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[test]
    fn test_miss_enters_no_phase() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root, parent, target], &trace);

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(200, 200));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert_eq!(result, EventResult::unhandled());
        assert!(trace.lock().unwrap().is_empty());
        assert_eq!(event.target(), None);
    }

    #[test]
    fn test_box_for_unknown_node_is_unhandled() {
        let tree = LayoutTree::new();
        let boxes = vec![LayoutBox::new(NodeId(7), Rect::new(0, 0, 10, 10))];
        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(1, 1));
        let result = dispatcher.dispatch(&tree, &boxes, &mut event);
        assert!(!result.handled);
    }

    #[test]
    fn test_immediate_stop_in_capture_skips_target_and_bubble() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[parent, target], &trace);

        let stopper = EventDelegator::new();
        stopper
            .on_during_phase(
                EventType::MOUSE_PRESS,
                |event: &mut Event| {
                    event.stop_immediate_propagation();
                    EventResult::consumed()
                },
                EventPhase::Capture,
            )
            .unwrap();
        tree.bind(root, Component::new("root").with_delegator(Arc::new(stopper)))
            .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert!(result.handled);
        assert!(trace.lock().unwrap().is_empty());
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[test]
    fn test_stop_in_bubble_keeps_earlier_results() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root], &trace);

        tree.bind(target, trace_component(&trace, "target", EventResult::handled()))
            .unwrap();

        let stopper = EventDelegator::new();
        let parent_trace = trace.clone();
        stopper
            .on_during_phase(
                EventType::MOUSE_PRESS,
                move |event: &mut Event| {
                    let node = event.current_target().unwrap();
                    parent_trace.lock().unwrap().push((event.phase(), node));
                    event.stop_propagation();
                    EventResult::unhandled()
                },
                EventPhase::Bubble,
            )
            .unwrap();
        tree.bind(parent, Component::new("parent").with_delegator(Arc::new(stopper)))
            .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert!(result.handled);
        assert!(result.updated);
        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                (EventPhase::Capture, root),
                (EventPhase::Target, target),
                (EventPhase::Bubble, parent),
            ]
        );
    }

    #[test]
    fn test_direct_mouse_handler_gets_local_coordinates() {
        let (mut tree, _, parent, target) = three_level_tree();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tree.bind(
            target,
            Component::new("target").with_mouse(move |mouse: &MouseEvent| {
                log.lock().unwrap().push(("target", mouse.position()));
                false
            }),
        )
        .unwrap();
        let log = seen.clone();
        tree.bind(
            parent,
            Component::new("parent").with_mouse(move |mouse: &MouseEvent| {
                log.lock().unwrap().push(("parent", mouse.position()));
                true
            }),
        )
        .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 17));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert!(result.handled);
        // Direct handlers are not invoked while capturing
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("target", Point::new(5, 7)), ("parent", Point::new(10, 12))]
        );
    }

    #[test]
    fn test_delegator_takes_precedence_over_direct_handler() {
        let (mut tree, _, _, target) = three_level_tree();
        let direct_called = Arc::new(AtomicBool::new(false));
        let flag = direct_called.clone();

        let delegator = EventDelegator::new();
        delegator
            .on(EventType::MOUSE_PRESS, |_: &mut Event| EventResult::handled())
            .unwrap();
        tree.bind(
            target,
            Component::new("target")
                .with_delegator(Arc::new(delegator))
                .with_mouse(move |_: &MouseEvent| {
                    flag.store(true, Ordering::SeqCst);
                    true
                }),
        )
        .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);
        assert!(result.handled);
        assert!(!direct_called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_primary_press_on_focusable_requests_focus() {
        let (mut tree, _, _, target) = three_level_tree();
        tree.bind(target, focusable_input(true)).unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);
        assert_eq!(result.focus_target, Some(target));
        assert_eq!(result.focus_change, FocusChange::Specific);

        let right = MouseEvent::new(15, 15, MouseAction::Press, MouseButton::Right);
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut Event::mouse(right));
        assert_eq!(result.focus_target, None);
    }

    #[test]
    fn test_declined_press_requests_no_focus() {
        let (mut tree, _, _, target) = three_level_tree();
        tree.bind(target, focusable_input(false)).unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);
        assert_eq!(result, EventResult::unhandled());
    }

    #[test]
    fn test_stop_at_target_skips_bubble_and_keeps_result() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root, parent], &trace);

        let delegator = EventDelegator::new();
        let target_trace = trace.clone();
        delegator
            .on(EventType::MOUSE_PRESS, move |event: &mut Event| {
                target_trace.lock().unwrap().push((event.phase(), target));
                event.stop_propagation();
                EventResult::handled()
            })
            .unwrap();
        tree.bind(target, Component::new("target").with_delegator(Arc::new(delegator)))
            .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert!(result.handled);
        assert!(result.updated);
        assert!(!event.is_immediate_propagation_stopped());
        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                (EventPhase::Capture, root),
                (EventPhase::Capture, parent),
                (EventPhase::Target, target),
            ]
        );
    }

    #[test]
    fn test_stop_in_capture_skips_deeper_nodes() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[parent, target], &trace);

        let stopper = EventDelegator::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        stopper
            .on(EventType::MOUSE_PRESS, move |event: &mut Event| {
                *counter.lock().unwrap() += 1;
                event.stop_propagation();
                EventResult::unhandled()
            })
            .unwrap();
        // A second handler on the same node still runs after a plain stop
        let counter = calls.clone();
        stopper
            .on(EventType::MOUSE_PRESS, move |_: &mut Event| {
                *counter.lock().unwrap() += 1;
                EventResult::consumed()
            })
            .unwrap();
        tree.bind(root, Component::new("root").with_delegator(Arc::new(stopper)))
            .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);

        assert!(result.handled);
        assert_eq!(*calls.lock().unwrap(), 2);
        assert!(trace.lock().unwrap().is_empty());
        assert_eq!(result.focus_target, None);
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[test]
    fn test_focus_on_press_can_be_disabled() {
        let (mut tree, _, _, target) = three_level_tree();
        tree.bind(target, focusable_input(true)).unwrap();

        let mut dispatcher = Dispatcher::with_config(DispatcherConfig {
            focus_on_press: false,
            ..DispatcherConfig::default()
        });
        let mut event = Event::mouse(MouseEvent::press(15, 15));
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut event);
        assert_eq!(result.focus_target, None);
    }

    #[test]
    fn test_tab_navigation() {
        let tree = LayoutTree::new();
        let mut dispatcher = Dispatcher::new();

        let mut tab = Event::key(KeyEvent::press(Key::Char('\t')));
        let result = dispatcher.dispatch(&tree, &[], &mut tab);
        assert!(result.handled);
        assert_eq!(result.focus_change, FocusChange::Next);

        let back = KeyEvent::new(Key::Tab, KeyAction::Press, Modifiers::SHIFT);
        let result = dispatcher.dispatch(&tree, &[], &mut Event::key(back));
        assert_eq!(result.focus_change, FocusChange::Prev);

        let mut other = Event::key(KeyEvent::press(Key::Char('a')));
        let result = dispatcher.dispatch(&tree, &[], &mut other);
        assert_eq!(result, EventResult::unhandled());

        let release = KeyEvent::new(Key::Tab, KeyAction::Release, Modifiers::empty());
        let result = dispatcher.dispatch(&tree, &[], &mut Event::key(release));
        assert!(!result.handled);
    }

    #[test]
    fn test_resize_is_handled_without_traversal() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root, parent, target], &trace);

        let mut dispatcher = Dispatcher::new();
        let result = dispatcher.dispatch(&tree, &tree.boxes(), &mut Event::resize(120, 40));
        assert!(result.handled);
        assert!(result.updated);
        assert!(trace.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_to_focused_node() {
        let (mut tree, _, _, target) = three_level_tree();
        let keys = Arc::new(Mutex::new(Vec::new()));
        let log = keys.clone();
        tree.bind(
            target,
            Component::new("input").with_key(move |key: &KeyEvent| {
                log.lock().unwrap().push(key.key);
                true
            }),
        )
        .unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut event = Event::key(KeyEvent::press(Key::Char('x')));
        let result = dispatcher.dispatch_to(&tree, target, &mut event);
        assert!(result.handled);
        assert_eq!(*keys.lock().unwrap(), vec![Key::Char('x')]);

        let mut event = Event::key(KeyEvent::press(Key::Enter));
        let result = dispatcher.dispatch_to(&tree, NodeId(99), &mut event);
        assert!(!result.handled);
    }

    #[test]
    fn test_tree_variant_matches_box_variant() {
        let (mut tree, root, parent, target) = three_level_tree();
        let trace: Trace = Arc::default();
        bind_traces(&mut tree, &[root, parent, target], &trace);

        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch_tree(&tree, &mut Event::mouse(MouseEvent::press(15, 15)));
        let via_tree = std::mem::take(&mut *trace.lock().unwrap());
        dispatcher.dispatch(&tree, &tree.boxes(), &mut Event::mouse(MouseEvent::press(15, 15)));
        let via_boxes = trace.lock().unwrap().clone();

        assert_eq!(via_tree, via_boxes);
        assert_eq!(dispatcher.hit_stats().hit_tests, 2);
    }
}
