use crate::config::TreeConfig;
use crate::context::{Argument, LiveContext};
use crate::error::{Result, TreeError};
use crate::guard::EditLock;
use crate::node::{HostedBy, Label, NodeArena, NodeBuilder, NodeId, NodeRecord, NodeState};
use crate::notify::{Channel, Observer, ObserverId, ObserverRegistry};
use crate::traverse;
use crate::view::SharedViewHost;
use crate::widget::{HookCx, Widget};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared reference to a tree, for composition roots that hand it around.
pub type SharedWidgetTree = Rc<WidgetTree>;

/// A tree of widgets and the lifecycle engine that drives it.
///
/// All methods take `&self` and no internal borrow is held while a hook or
/// observer runs, so hooks can call back into the tree. The tree is confined
/// to one thread; work elsewhere observes a node only through its
/// [dispose token](WidgetTree::dispose_token).
pub struct WidgetTree {
    nodes: RefCell<NodeArena>,
    observers: RefCell<ObserverRegistry>,
    surface: RefCell<Option<SharedViewHost>>,
    config: TreeConfig,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: RefCell::new(NodeArena::new()),
            observers: RefCell::new(ObserverRegistry::new()),
            surface: RefCell::new(None),
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Install the host of last resort, consulted when no ancestor accepts a view.
    pub fn set_surface(&self, surface: SharedViewHost) {
        *self.surface.borrow_mut() = Some(surface);
    }

    pub fn clear_surface(&self) -> Option<SharedViewHost> {
        self.surface.borrow_mut().take()
    }

    // Creation

    pub fn create<W: Widget>(&self, widget: W) -> NodeId {
        self.insert(NodeBuilder::new(widget))
    }

    pub fn insert(&self, builder: NodeBuilder) -> NodeId {
        let label = builder
            .label
            .unwrap_or_else(|| Label::from(short_type_name(builder.widget_type)));
        let record = NodeRecord {
            label,
            state: NodeState::Unattached,
            disposed: false,
            parent: None,
            children: Vec::new(),
            context: None,
            dispose_on_detach: builder
                .dispose_on_detach
                .unwrap_or(self.config.disposes_on_detach()),
            widget: builder.widget,
            widget_type: builder.widget_type,
            view: builder.view,
            hosted_by: None,
            dispose_token: None,
            lock: Arc::new(Mutex::new(())),
        };
        let id = self.nodes.borrow_mut().create(record);
        debug!(node = %id, "created");
        id
    }

    // Structural edits

    /// Link `child` under `parent`. If the parent is attached, the child's
    /// whole subtree is attached into the parent's context with `argument`.
    pub fn add_child(&self, parent: NodeId, child: NodeId, argument: Option<Argument>) -> Result<()> {
        if parent == child {
            return Err(TreeError::Cycle { parent, child });
        }
        let (lock, parent_state, context) = self.with_record(parent, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: parent });
            }
            if r.state.is_transitioning() {
                return Err(TreeError::MidTransition {
                    node: parent,
                    state: r.state,
                });
            }
            Ok((r.lock.clone(), r.state, r.context.clone()))
        })??;
        self.with_record(child, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: child });
            }
            match r.parent {
                Some(current) => Err(TreeError::AlreadyParented {
                    child,
                    parent: current,
                }),
                None => Ok(()),
            }
        })??;
        if self.ancestors(parent)?.contains(&child) {
            return Err(TreeError::Cycle { parent, child });
        }
        if parent_state != NodeState::Attached && argument.is_some() {
            return Err(TreeError::UnexpectedArgument { node: parent });
        }
        traverse::check_attach(self, child)?;

        let _lock = EditLock::acquire(parent, &lock)?;
        self.link(parent, child)?;
        debug!(parent = %parent, child = %child, "child added");

        if let Some(context) = context.filter(|_| parent_state == NodeState::Attached) {
            if let Err(err) = traverse::attach_subtree(self, child, &context, argument.as_ref()) {
                self.unlink(parent, child)?;
                debug!(parent = %parent, child = %child, "child add undone");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Unlink `child` from `parent`, detaching its subtree first when the
    /// parent is attached. Disposes the child afterwards if its policy asks.
    pub fn remove_child(&self, parent: NodeId, child: NodeId, argument: Option<Argument>) -> Result<()> {
        let (lock, parent_state, context) = self.with_record(parent, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: parent });
            }
            if r.state.is_transitioning() {
                return Err(TreeError::MidTransition {
                    node: parent,
                    state: r.state,
                });
            }
            Ok((r.lock.clone(), r.state, r.context.clone()))
        })??;
        let dispose_on_detach = self.with_record(child, |r| {
            if r.parent != Some(parent) {
                return Err(TreeError::NotAChild { parent, child });
            }
            if r.disposed {
                return Err(TreeError::Disposed { node: child });
            }
            Ok(r.dispose_on_detach)
        })??;
        if parent_state != NodeState::Attached && argument.is_some() {
            return Err(TreeError::UnexpectedArgument { node: parent });
        }
        match &context {
            Some(context) if parent_state == NodeState::Attached => {
                traverse::check_detach(self, child, context)?
            }
            _ => traverse::check_idle(self, child)?,
        }

        {
            let _lock = EditLock::acquire(parent, &lock)?;
            let detached = match context.filter(|_| parent_state == NodeState::Attached) {
                Some(context) => traverse::detach_subtree(self, child, &context, argument.as_ref()),
                None => Ok(()),
            };
            self.unlink(parent, child)?;
            debug!(parent = %parent, child = %child, "child removed");
            detached?;
        }

        if dispose_on_detach {
            self.dispose(child)?;
        }
        Ok(())
    }

    /// Attach a parentless node and its subtree into `context`.
    pub fn attach_root(&self, root: NodeId, context: LiveContext, argument: Option<Argument>) -> Result<()> {
        let lock = self.with_record(root, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: root });
            }
            if let Some(parent) = r.parent {
                return Err(TreeError::NotRoot { node: root, parent });
            }
            Ok(r.lock.clone())
        })??;
        traverse::check_attach(self, root)?;

        let _lock = EditLock::acquire(root, &lock)?;
        debug!(root = %root, "attaching root");
        traverse::attach_subtree(self, root, &context, argument.as_ref())
    }

    /// Detach a root from its context. Disposes it afterwards if its policy asks.
    pub fn detach_root(&self, root: NodeId, argument: Option<Argument>) -> Result<()> {
        let (lock, context, dispose_on_detach) = self.with_record(root, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: root });
            }
            if let Some(parent) = r.parent {
                return Err(TreeError::NotRoot { node: root, parent });
            }
            match (&r.context, r.state) {
                (Some(context), NodeState::Attached) => {
                    Ok((r.lock.clone(), context.clone(), r.dispose_on_detach))
                }
                _ => Err(TreeError::NotAttached {
                    node: root,
                    state: r.state,
                }),
            }
        })??;
        traverse::check_detach(self, root, &context)?;

        {
            let _lock = EditLock::acquire(root, &lock)?;
            debug!(root = %root, "detaching root");
            traverse::detach_subtree(self, root, &context, argument.as_ref())?;
        }

        if dispose_on_detach {
            self.dispose(root)?;
        }
        Ok(())
    }

    /// Remove a node from its parent, or detach it from its context if it is
    /// an attached root.
    pub fn detach_self(&self, node: NodeId, argument: Option<Argument>) -> Result<()> {
        let (parent, state) = self.with_record(node, |r| (r.parent, r.state))?;
        match parent {
            Some(parent) => self.remove_child(parent, node, argument),
            None if state == NodeState::Attached => self.detach_root(node, argument),
            None => Err(TreeError::NotAttached { node, state }),
        }
    }

    /// Remove every child of `parent`, last one first.
    pub fn remove_children(&self, parent: NodeId, argument: Option<Argument>) -> Result<()> {
        for child in self.children(parent)?.into_iter().rev() {
            self.remove_child(parent, child, argument.clone())?;
        }
        Ok(())
    }

    /// Remove the last child of `parent` whose widget is a `W`.
    pub fn remove_last_child_of<W: Widget>(&self, parent: NodeId, argument: Option<Argument>) -> Result<NodeId> {
        let mut found = None;
        for child in self.children(parent)?.into_iter().rev() {
            let widget = self.widget_handle(child)?;
            if (widget.as_ref() as &dyn Any).is::<W>() {
                found = Some(child);
                break;
            }
        }
        let child = found.ok_or(TreeError::NoChildOfType {
            parent,
            expected: type_name::<W>(),
        })?;
        self.remove_child(parent, child, argument)?;
        Ok(child)
    }

    /// Dispose a non-live, parentless node and its whole subtree.
    ///
    /// Children are disposed first in list order; the node's dispose token is
    /// cancelled last.
    pub fn dispose(&self, node: NodeId) -> Result<()> {
        self.with_record(node, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node });
            }
            if let Some(parent) = r.parent {
                return Err(TreeError::StillParented { node, parent });
            }
            Ok(())
        })??;

        // Validate everything up front so a failure leaves the subtree untouched
        for id in self.descendants_and_self(node)? {
            self.with_record(id, |r| {
                if r.disposed {
                    return Err(TreeError::Disposed { node: id });
                }
                if r.state.is_live() {
                    return Err(TreeError::StillLive { node: id, state: r.state });
                }
                if r.lock.is_locked() {
                    return Err(TreeError::Reentrant { node: id });
                }
                Ok(())
            })??;
        }

        self.dispose_subtree(node)
    }

    fn dispose_subtree(&self, node: NodeId) -> Result<()> {
        let (lock, state) = self.with_record(node, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node });
            }
            Ok((r.lock.clone(), r.state))
        })??;
        if state.is_live() {
            return Err(TreeError::StillLive { node, state });
        }

        let token = {
            let _lock = EditLock::acquire(node, &lock)?;
            let children = self.children(node)?;
            for &child in &children {
                self.dispose_subtree(child)?;
            }
            for &child in &children {
                if !self.is_disposed(child)? {
                    return Err(TreeError::ChildrenNotDisposed { node, child });
                }
            }
            let widget = self.widget_handle(node)?;
            widget.on_dispose(&HookCx::new(self, node, None));
            self.with_record_mut(node, |r| {
                r.disposed = true;
                r.dispose_token.clone()
            })?
        };
        debug!(node = %node, "disposed");

        if let Some(token) = token {
            token.cancel();
        }
        Ok(())
    }

    /// Drop the storage of a disposed, parentless node and its subtree.
    /// Its id and the ids below it become unknown to the tree.
    pub fn forget(&self, node: NodeId) -> Result<()> {
        self.with_record(node, |r| {
            if !r.disposed {
                return Err(TreeError::NotDisposed { node });
            }
            if let Some(parent) = r.parent {
                return Err(TreeError::StillParented { node, parent });
            }
            Ok(())
        })??;

        let ids = self.descendants_and_self(node)?;
        let mut nodes = self.nodes.borrow_mut();
        let mut observers = self.observers.borrow_mut();
        for id in ids {
            nodes.remove(id);
            observers.clear_node(id);
        }
        debug!(node = %node, "forgotten");
        Ok(())
    }

    // Observers

    /// Register a callback on one of the node's channels. Callbacks of one
    /// channel run in registration order, after the widget's own hook.
    pub fn observe(
        &self,
        node: NodeId,
        channel: Channel,
        observer: impl Fn(&HookCx<'_>, NodeId) + 'static,
    ) -> Result<ObserverId> {
        self.with_record(node, |r| {
            if r.disposed {
                Err(TreeError::Disposed { node })
            } else {
                Ok(())
            }
        })??;
        Ok(self
            .observers
            .borrow_mut()
            .add(node, channel, Rc::new(observer)))
    }

    pub fn unobserve(&self, node: NodeId, id: ObserverId) -> bool {
        self.observers.borrow_mut().remove(node, id)
    }

    pub fn observer_count(&self, node: NodeId, channel: Channel) -> usize {
        self.observers.borrow().count(node, channel)
    }

    // Queries

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.borrow().get(node).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    pub fn state(&self, node: NodeId) -> Result<NodeState> {
        self.with_record(node, |r| r.state)
    }

    pub fn is_attached(&self, node: NodeId) -> Result<bool> {
        Ok(self.state(node)? == NodeState::Attached)
    }

    pub fn is_attaching(&self, node: NodeId) -> Result<bool> {
        Ok(self.state(node)? == NodeState::Attaching)
    }

    pub fn is_detaching(&self, node: NodeId) -> Result<bool> {
        Ok(self.state(node)? == NodeState::Detaching)
    }

    /// `Unattached` or `Detached`.
    pub fn is_non_attached(&self, node: NodeId) -> Result<bool> {
        Ok(!self.state(node)?.is_live())
    }

    pub fn is_disposed(&self, node: NodeId) -> Result<bool> {
        self.with_record(node, |r| r.disposed)
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.with_record(node, |r| r.parent)
    }

    pub fn is_root(&self, node: NodeId) -> Result<bool> {
        Ok(self.parent(node)?.is_none())
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.with_record(node, |r| r.children.clone())
    }

    pub fn has_children(&self, node: NodeId) -> Result<bool> {
        self.with_record(node, |r| !r.children.is_empty())
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(node)?;
        while let Some(id) = current {
            ancestors.push(id);
            current = self.parent(id)?;
        }
        Ok(ancestors)
    }

    pub fn ancestors_and_self(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut ancestors = self.ancestors(node)?;
        ancestors.insert(0, node);
        Ok(ancestors)
    }

    /// Descendants in pre-order, children in list order.
    pub fn descendants(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node)?.into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id)?.into_iter().rev());
        }
        Ok(out)
    }

    pub fn descendants_and_self(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut out = self.descendants(node)?;
        out.insert(0, node);
        Ok(out)
    }

    pub fn context(&self, node: NodeId) -> Result<Option<LiveContext>> {
        self.with_record(node, |r| r.context.clone())
    }

    pub fn label(&self, node: NodeId) -> Result<String> {
        self.with_record(node, |r| r.label.to_string())
    }

    pub fn is_viewable(&self, node: NodeId) -> Result<bool> {
        self.with_record(node, |r| r.is_viewable())
    }

    /// Where the node's view is currently shown, if it is.
    pub fn view_host(&self, node: NodeId) -> Result<Option<HostedBy>> {
        self.with_record(node, |r| r.hosted_by)
    }

    pub fn dispose_on_detach(&self, node: NodeId) -> Result<bool> {
        self.with_record(node, |r| r.dispose_on_detach)
    }

    /// Typed access to a node's widget.
    pub fn widget<W: Widget>(&self, node: NodeId) -> Result<Rc<W>> {
        let (widget, found) = self.with_record(node, |r| (r.widget.clone(), r.widget_type))?;
        let widget: Rc<dyn Any> = widget;
        widget.downcast::<W>().map_err(|_| TreeError::TypeMismatch {
            node,
            expected: type_name::<W>(),
            found,
        })
    }

    /// The token cancelled when the node is disposed. Created on first use;
    /// requesting it after disposal yields an already cancelled token.
    pub fn dispose_token(&self, node: NodeId) -> Result<CancellationToken> {
        self.with_record_mut(node, |r| {
            r.dispose_token
                .get_or_insert_with(|| {
                    let token = CancellationToken::new();
                    if r.disposed {
                        token.cancel();
                    }
                    token
                })
                .clone()
        })
    }

    /// Indented outline of a subtree, one node per line.
    pub fn dump(&self, root: NodeId) -> Result<String> {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0)?;
        Ok(output)
    }

    fn dump_node(&self, output: &mut String, node: NodeId, depth: usize) -> Result<()> {
        let (label, state, disposed, viewable) = self.with_record(node, |r| {
            (r.label.clone(), r.state, r.disposed, r.is_viewable())
        })?;
        let indent = "  ".repeat(depth);
        let _ = write!(output, "{}{} {} [{}]", indent, label, node, state.as_str());
        if viewable {
            output.push_str(" view");
        }
        if disposed {
            output.push_str(" disposed");
        }
        output.push('\n');
        for child in self.children(node)? {
            self.dump_node(output, child, depth + 1)?;
        }
        Ok(())
    }

    // Internals shared with the traversal, notification and routing modules.
    // None of them may hold a borrow while user code runs.

    pub(crate) fn with_record<R>(&self, node: NodeId, f: impl FnOnce(&NodeRecord) -> R) -> Result<R> {
        let nodes = self.nodes.borrow();
        let record = nodes.get(node).ok_or(TreeError::UnknownNode { node })?;
        Ok(f(record))
    }

    pub(crate) fn with_record_mut<R>(
        &self,
        node: NodeId,
        f: impl FnOnce(&mut NodeRecord) -> R,
    ) -> Result<R> {
        let mut nodes = self.nodes.borrow_mut();
        let record = nodes.get_mut(node).ok_or(TreeError::UnknownNode { node })?;
        Ok(f(record))
    }

    pub(crate) fn widget_handle(&self, node: NodeId) -> Result<Rc<dyn Widget>> {
        self.with_record(node, |r| r.widget.clone())
    }

    pub(crate) fn observers_for(&self, node: NodeId, channel: Channel) -> SmallVec<[Observer; 2]> {
        self.observers.borrow().snapshot(node, channel)
    }

    pub(crate) fn surface(&self) -> Option<SharedViewHost> {
        self.surface.borrow().clone()
    }

    fn link(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.with_record_mut(child, |r| r.parent = Some(parent))?;
        self.with_record_mut(parent, |r| r.children.push(child))
    }

    fn unlink(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.with_record_mut(parent, |r| r.children.retain(|&c| c != child))?;
        self.with_record_mut(child, |r| r.parent = None)
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
