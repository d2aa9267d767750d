/// Integration tests for routing views to the nearest accepting host.
mod common;

use canopy_tree::view::shared;
use canopy_tree::{
    Blank, ErrorKind, HostedBy, LiveContext, NodeBuilder, NodeId, NodeState, SharedViewHost,
    StubHost, TreeError, ViewCapability, ViewContent, ViewHost, ViewStack, WidgetTree,
};
use common::viewable;
use std::cell::RefCell;
use std::rc::Rc;

fn screen() -> LiveContext {
    LiveContext::new("screen")
}

fn host_node(tree: &WidgetTree, label: &str, host: SharedViewHost) -> NodeId {
    tree.insert(
        NodeBuilder::new(Blank)
            .label(label)
            .view(ViewCapability::new(ViewContent::named(label)).hosting(host)),
    )
}

fn chain(tree: &WidgetTree, nodes: &[NodeId]) {
    for pair in nodes.windows(2) {
        tree.add_child(pair[0], pair[1], None).unwrap();
    }
}

#[test]
fn test_view_resolves_past_plain_nodes() {
    let tree = WidgetTree::new();
    tree.set_surface(shared(StubHost::new("surface")));

    let stack = shared(ViewStack::new());
    let h = host_node(&tree, "H", stack.clone());
    let m1 = tree.create(Blank);
    let m2 = tree.create(Blank);
    let v = viewable(&tree, "V");
    chain(&tree, &[h, m1, m2, v]);

    tree.attach_root(h, screen(), None).unwrap();

    assert_eq!(tree.view_host(v).unwrap(), Some(HostedBy::Ancestor(h)));
    assert_eq!(tree.view_host(h).unwrap(), Some(HostedBy::Surface));
    assert_eq!(tree.view_host(m1).unwrap(), None);
    assert!(!tree.is_viewable(m2).unwrap());
    assert_eq!(stack.borrow().names(), vec!["V"]);

    tree.detach_root(h, None).unwrap();
    assert!(stack.borrow().is_empty());
    assert_eq!(tree.view_host(v).unwrap(), None);
}

#[test]
fn test_surface_sees_views_in_attach_and_detach_order() {
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let tree = WidgetTree::new();
    tree.set_surface(shared(StubHost::with_buffer("surface", buffer.clone())));

    let root = viewable(&tree, "menu");
    let title = viewable(&tree, "title");
    let play = viewable(&tree, "play");
    tree.add_child(root, title, None).unwrap();
    tree.add_child(root, play, None).unwrap();

    tree.attach_root(root, screen(), None).unwrap();
    tree.detach_root(root, None).unwrap();

    assert_eq!(
        *buffer.borrow(),
        vec![
            "surface: show menu",
            "surface: show title",
            "surface: show play",
            "surface: hide play",
            "surface: hide title",
            "surface: hide menu",
        ]
    );
}

#[test]
fn test_unhosted_view_fails_attach() {
    let tree = WidgetTree::new();
    let lonely = viewable(&tree, "lonely");

    let err = tree.attach_root(lonely, screen(), None).unwrap_err();
    assert_eq!(err, TreeError::Unhosted { node: lonely });
    assert_eq!(err.kind(), ErrorKind::Hosting);
    assert_eq!(tree.view_host(lonely).unwrap(), None);
    assert_eq!(tree.state(lonely).unwrap(), NodeState::Unattached);
    assert!(tree.context(lonely).unwrap().is_none());

    tree.set_surface(shared(StubHost::new("surface")));
    tree.attach_root(lonely, screen(), None).unwrap();
    assert_eq!(tree.view_host(lonely).unwrap(), Some(HostedBy::Surface));
}

#[test]
fn test_declined_view_walks_further_up() {
    let tree = WidgetTree::new();
    tree.set_surface(shared(StubHost::new("surface")));

    let outer_stack = shared(ViewStack::new());
    let inner_stack = shared(ViewStack::with_capacity(1));
    let outer = host_node(&tree, "outer", outer_stack.clone());
    let inner = host_node(&tree, "inner", inner_stack.clone());
    let first = viewable(&tree, "first");
    let second = viewable(&tree, "second");
    tree.add_child(outer, inner, None).unwrap();
    tree.add_child(inner, first, None).unwrap();
    tree.add_child(inner, second, None).unwrap();

    tree.attach_root(outer, screen(), None).unwrap();

    assert_eq!(inner_stack.borrow().names(), vec!["first"]);
    assert_eq!(outer_stack.borrow().names(), vec!["inner", "second"]);
    assert_eq!(tree.view_host(second).unwrap(), Some(HostedBy::Ancestor(outer)));

    tree.remove_child(inner, second, None).unwrap();
    assert_eq!(outer_stack.borrow().names(), vec!["inner"]);
}

#[test]
fn test_filtering_host_only_takes_matching_views() {
    let tree = WidgetTree::new();
    tree.set_surface(shared(StubHost::new("surface")));

    let dialogs = shared(ViewStack::new().accepting(|c| c.name().starts_with("dialog")));
    let root = host_node(&tree, "root", dialogs.clone());
    let dialog = viewable(&tree, "dialog-quit");
    let toast = viewable(&tree, "toast");
    tree.attach_root(root, screen(), None).unwrap();

    tree.add_child(root, dialog, None).unwrap();
    tree.add_child(root, toast, None).unwrap();

    assert_eq!(dialogs.borrow().names(), vec!["dialog-quit"]);
    assert_eq!(tree.view_host(toast).unwrap(), Some(HostedBy::Surface));
}

#[test]
fn test_unhosted_child_is_rolled_back_and_unlinked() {
    let tree = WidgetTree::new();
    let root = tree.create(Blank);
    tree.attach_root(root, screen(), None).unwrap();

    let child = viewable(&tree, "orphan");
    let err = tree.add_child(root, child, None).unwrap_err();
    assert_eq!(err, TreeError::Unhosted { node: child });
    assert_eq!(err.kind(), ErrorKind::Hosting);

    assert_eq!(tree.state(root).unwrap(), NodeState::Attached);
    assert_eq!(tree.state(child).unwrap(), NodeState::Unattached);
    assert!(tree.context(child).unwrap().is_none());
    assert_eq!(tree.view_host(child).unwrap(), None);
    assert_eq!(tree.parent(child).unwrap(), None);
    assert!(tree.children(root).unwrap().is_empty());

    tree.detach_root(root, None).unwrap();
    assert_eq!(tree.state(root).unwrap(), NodeState::Detached);
    tree.dispose(root).unwrap();
    tree.dispose(child).unwrap();
}

#[test]
fn test_failed_nested_attach_releases_views_already_shown() {
    let tree = WidgetTree::new();
    tree.set_surface(shared(ViewStack::new().accepting(|c| c.name() == "root")));

    let dialogs = shared(ViewStack::new().accepting(|c| c.name().starts_with("dialog")));
    let root = host_node(&tree, "root", dialogs.clone());
    tree.attach_root(root, screen(), None).unwrap();

    let dialog = viewable(&tree, "dialog-save");
    let toast = viewable(&tree, "toast");
    tree.add_child(dialog, toast, None).unwrap();

    let err = tree.add_child(root, dialog, None).unwrap_err();
    assert_eq!(err, TreeError::Unhosted { node: toast });

    assert!(dialogs.borrow().is_empty());
    for id in [dialog, toast] {
        assert_eq!(tree.state(id).unwrap(), NodeState::Unattached);
        assert_eq!(tree.view_host(id).unwrap(), None);
        assert!(tree.context(id).unwrap().is_none());
    }
    assert_eq!(tree.parent(dialog).unwrap(), None);
    assert_eq!(tree.parent(toast).unwrap(), Some(dialog));

    // Once the toast is gone the same subtree attaches normally
    tree.remove_child(dialog, toast, None).unwrap();
    tree.add_child(root, dialog, None).unwrap();
    assert_eq!(dialogs.borrow().names(), vec!["dialog-save"]);
    assert_eq!(tree.view_host(dialog).unwrap(), Some(HostedBy::Ancestor(root)));
}

/// Declines every view but claims to hide anything it is asked to.
#[derive(Default)]
struct Greedy {
    hides: Vec<String>,
}

impl ViewHost for Greedy {
    fn try_show(&mut self, _content: &ViewContent) -> bool {
        false
    }

    fn try_hide(&mut self, content: &ViewContent) -> bool {
        self.hides.push(content.name().to_string());
        true
    }
}

#[test]
fn test_hide_goes_to_the_host_that_showed_the_view() {
    let tree = WidgetTree::new();
    tree.set_surface(shared(StubHost::new("surface")));

    let stack = shared(ViewStack::new());
    let greedy = shared(Greedy::default());
    let outer = host_node(&tree, "outer", stack.clone());
    let middle = host_node(&tree, "middle", greedy.clone());
    let v = viewable(&tree, "V");
    chain(&tree, &[outer, middle, v]);

    tree.attach_root(outer, screen(), None).unwrap();
    assert_eq!(tree.view_host(v).unwrap(), Some(HostedBy::Ancestor(outer)));
    assert_eq!(stack.borrow().names(), vec!["middle", "V"]);

    tree.remove_child(middle, v, None).unwrap();
    assert_eq!(stack.borrow().names(), vec!["middle"]);
    assert!(greedy.borrow().hides.is_empty());
    assert_eq!(tree.view_host(v).unwrap(), None);
}
