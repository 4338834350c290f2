//! Reconciliation properties against a live tree

use std::cell::RefCell;
use std::rc::Rc;

use twig_dom::{DomEvent, DomTree, MutationRecord, NodeId};
use twig_vdom::{Attrs, EventRegistry, Handler, Reconciler, VNode, children, h, text};

struct Mount {
    tree: DomTree,
    events: EventRegistry,
    retained: Option<VNode>,
}

impl Mount {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut tree = DomTree::new();
        let mut events = EventRegistry::new();
        events.set_root(&mut tree, NodeId::ROOT);
        Self {
            tree,
            events,
            retained: None,
        }
    }

    fn render(&mut self, vnode: VNode) {
        Reconciler::new(&mut self.tree, &mut self.events)
            .render(NodeId::ROOT, self.retained.as_ref(), &vnode)
            .unwrap();
        self.retained = Some(vnode);
    }

    fn top(&self) -> NodeId {
        self.tree.child_at(NodeId::ROOT, 0).unwrap()
    }
}

fn keyed_list(keys: &[&str]) -> VNode {
    h(
        "ul",
        Attrs::new().attr("class", "todo-list"),
        keys.iter()
            .map(|k| h("li", Attrs::new().key(*k).attr("class", "item"), text(*k)))
            .collect::<Vec<_>>(),
    )
}

fn form(value: &str) -> VNode {
    h(
        "form",
        Attrs::new().attr("class", "entry"),
        children![
            h(
                "input",
                Attrs::new()
                    .attr("value", value)
                    .attr("placeholder", "What needs to be done?")
                    .flag("autofocus", true),
                ()
            ),
            h("input", Attrs::new().attr("type", "checkbox").attr("checked", true), ()),
            h("p", Attrs::new(), children!["count: ", 3]),
        ],
    )
}

#[test]
fn test_rerender_same_tree_is_silent() {
    let mut mount = Mount::new();
    mount.render(form("abc"));

    mount.tree.record_mutations(true);
    mount.render(form("abc"));

    assert_eq!(mount.tree.take_mutations(), Vec::new());
}

#[test]
fn test_keyed_reorder_moves_nodes() {
    let mut mount = Mount::new();
    mount.render(keyed_list(&["a", "b", "c"]));
    let ul = mount.top();
    let before = mount.tree.children(ul).to_vec();

    mount.tree.record_mutations(true);
    mount.render(keyed_list(&["c", "a", "b"]));
    let records = mount.tree.take_mutations();

    let after = mount.tree.children(ul).to_vec();
    assert_eq!(after, vec![before[2], before[0], before[1]]);
    assert_eq!(mount.tree.text_content(ul), "cab");
    assert!(!records.iter().any(|r| matches!(r, MutationRecord::Created { .. })));
    assert!(!records.iter().any(|r| matches!(r, MutationRecord::Removed { .. })));
}

#[test]
fn test_keyed_removal_removes_one() {
    let mut mount = Mount::new();
    mount.render(keyed_list(&["a", "b", "c"]));
    let ul = mount.top();
    let before = mount.tree.children(ul).to_vec();

    mount.tree.record_mutations(true);
    mount.render(keyed_list(&["a", "c"]));
    let records = mount.tree.take_mutations();

    let removed: Vec<_> = records
        .iter()
        .filter_map(|r| match r {
            MutationRecord::Removed { node, .. } => Some(*node),
            _ => None,
        })
        .collect();
    assert_eq!(removed, vec![before[1]]);
    assert!(!records.iter().any(|r| matches!(r, MutationRecord::Created { .. })));
    assert_eq!(mount.tree.children(ul), &[before[0], before[2]]);
}

#[test]
fn test_mixed_keyed_and_unkeyed_siblings() {
    let view = |keys: &[&str]| {
        let mut items: Vec<VNode> = vec![h("li", Attrs::new().attr("class", "header"), "head")];
        items.extend(keys.iter().map(|k| h("li", Attrs::new().key(*k), text(*k))));
        items.push(h("li", Attrs::new().attr("class", "footer"), "foot"));
        h("ul", Attrs::new(), items)
    };

    let mut mount = Mount::new();
    mount.render(view(&["a", "b"]));
    let ul = mount.top();
    let before = mount.tree.children(ul).to_vec();

    mount.render(view(&["b", "a"]));
    let after = mount.tree.children(ul).to_vec();

    // Unkeyed siblings are paired in order, keyed ones by key
    assert_eq!(after, vec![before[0], before[2], before[1], before[3]]);
    assert_eq!(mount.tree.text_content(ul), "headbafoot");
}

#[test]
fn test_handler_ids_per_event_name() {
    let mut mount = Mount::new();
    let handler = Handler::new(|_| {});
    let view = |h1: &Handler| {
        h(
            "div",
            Attrs::new()
                .handler("click", h1.clone())
                .handler("dblclick", h1.clone()),
            (),
        )
    };

    mount.render(view(&handler));
    let div = mount.top();
    let click = mount.tree.get_attribute(div, "data-ev-click").map(str::to_owned);
    let dblclick = mount.tree.get_attribute(div, "data-ev-dblclick").map(str::to_owned);
    assert_ne!(click, dblclick);

    mount.render(view(&handler));
    assert_eq!(mount.tree.get_attribute(div, "data-ev-click").map(str::to_owned), click);
    assert_eq!(mount.events.handler_count(), 2);
    assert_eq!(mount.tree.listener_count(NodeId::ROOT), 2);
}

#[test]
fn test_fresh_closure_rebinds_to_latest() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let view = |label: &'static str| {
        let log = log.clone();
        h(
            "button",
            Attrs::new().on("click", move |_| log.borrow_mut().push(label)),
            "go",
        )
    };

    let mut mount = Mount::new();
    mount.render(view("first"));
    mount.render(view("second"));
    let button = mount.top();

    assert!(mount.events.dispatch(&mount.tree, &mut DomEvent::click(button)));
    assert_eq!(*log.borrow(), vec!["second"]);
    assert_eq!(mount.tree.listener_count(NodeId::ROOT), 1);
}

#[test]
fn test_nearest_bound_ancestor_only() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (outer_log, inner_log) = (log.clone(), log.clone());

    let mut mount = Mount::new();
    mount.render(h(
        "li",
        Attrs::new().on("click", move |_| outer_log.borrow_mut().push("li")),
        h(
            "button",
            Attrs::new().on("click", move |_| inner_log.borrow_mut().push("button")),
            h("span", Attrs::new(), "x"),
        ),
    ));
    let li = mount.top();
    let button = mount.tree.child_at(li, 0).unwrap();
    let span = mount.tree.child_at(button, 0).unwrap();

    mount.events.dispatch(&mount.tree, &mut DomEvent::click(span));
    mount.events.dispatch(&mount.tree, &mut DomEvent::click(li));
    assert_eq!(*log.borrow(), vec!["button", "li"]);
}

#[test]
fn test_surface_drift_recovers() {
    let mut mount = Mount::new();
    mount.render(keyed_list(&["a", "b"]));
    let ul = mount.top();

    // Someone else replaced a list item with a different element
    let stray = mount.tree.create_element("div");
    let first = mount.tree.child_at(ul, 0).unwrap();
    mount.tree.replace_child(ul, stray, first).unwrap();

    mount.render(keyed_list(&["a", "b", "c"]));
    let tags: Vec<_> = mount
        .tree
        .children(ul)
        .iter()
        .map(|&id| mount.tree.tag_name(id).unwrap_or_default().to_string())
        .collect();
    assert_eq!(tags, ["li", "li", "li"]);
    assert_eq!(mount.tree.text_content(ul), "abc");
}

#[test]
fn test_controlled_input_reverts() {
    let mut mount = Mount::new();
    mount.render(form("abc"));
    let input = mount.tree.child_at(mount.top(), 0).unwrap();

    mount.tree.input_text(input, "abcdef").unwrap();
    mount.render(form("abc"));
    assert_eq!(mount.tree.value(input), Some("abc"));
}
