//! Shared helpers for the integration tests.
#![allow(dead_code)]

use canopy_tree::{HookCx, NodeBuilder, NodeId, ViewCapability, ViewContent, Widget, WidgetTree};
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

/// Widget that records every hook it receives as `label.hook` or
/// `label.hook(descendant)`.
pub struct Recorder {
    log: Log,
}

impl Recorder {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }

    fn own(&self, cx: &HookCx<'_>, hook: &str) {
        let label = cx.tree.label(cx.node).unwrap();
        self.log.borrow_mut().push(format!("{label}.{hook}"));
    }

    fn descendant(&self, cx: &HookCx<'_>, hook: &str, descendant: NodeId) {
        let label = cx.tree.label(cx.node).unwrap();
        let other = cx.tree.label(descendant).unwrap();
        self.log.borrow_mut().push(format!("{label}.{hook}({other})"));
    }
}

impl Widget for Recorder {
    fn before_attach(&self, cx: &HookCx<'_>) {
        self.own(cx, "before_attach");
    }

    fn on_attach(&self, cx: &HookCx<'_>) {
        self.own(cx, "on_attach");
    }

    fn after_attach(&self, cx: &HookCx<'_>) {
        self.own(cx, "after_attach");
    }

    fn before_detach(&self, cx: &HookCx<'_>) {
        self.own(cx, "before_detach");
    }

    fn on_detach(&self, cx: &HookCx<'_>) {
        self.own(cx, "on_detach");
    }

    fn after_detach(&self, cx: &HookCx<'_>) {
        self.own(cx, "after_detach");
    }

    fn before_descendant_attach(&self, cx: &HookCx<'_>, descendant: NodeId) {
        self.descendant(cx, "before_descendant_attach", descendant);
    }

    fn after_descendant_attach(&self, cx: &HookCx<'_>, descendant: NodeId) {
        self.descendant(cx, "after_descendant_attach", descendant);
    }

    fn before_descendant_detach(&self, cx: &HookCx<'_>, descendant: NodeId) {
        self.descendant(cx, "before_descendant_detach", descendant);
    }

    fn after_descendant_detach(&self, cx: &HookCx<'_>, descendant: NodeId) {
        self.descendant(cx, "after_descendant_detach", descendant);
    }

    fn on_dispose(&self, cx: &HookCx<'_>) {
        self.own(cx, "on_dispose");
    }
}

pub fn recorder(tree: &WidgetTree, log: &Log, label: &str) -> NodeId {
    tree.insert(NodeBuilder::new(Recorder::new(log)).label(label))
}

/// A node without hooks whose content is shown while it is live.
pub fn viewable(tree: &WidgetTree, label: &str) -> NodeId {
    tree.insert(
        NodeBuilder::new(canopy_tree::Blank)
            .label(label)
            .view(ViewCapability::new(ViewContent::named(label))),
    )
}

/// Keep only entries that mention one of `hooks`.
pub fn only(entries: Vec<String>, hooks: &[&str]) -> Vec<String> {
    entries
        .into_iter()
        .filter(|e| hooks.iter().any(|h| e.contains(h)))
        .collect()
}
