use anyhow::{Context, Result};
use canopy_tree::view::shared;
use canopy_tree::{
    Blank, HookCx, HostedBy, Interrupted, LiveContext, NodeBuilder, NodeId, StubHost,
    TreeConfig, ViewCapability, ViewContent, ViewStack, Widget, WidgetTree, run_until_disposed,
};
use colored::Colorize;
use std::time::{Duration, Instant};

/// Prints every hook it receives, indented by depth.
struct Tracer {
    descendants: bool,
}

impl Tracer {
    fn own(&self, cx: &HookCx<'_>, hook: &str) {
        let depth = cx.tree.ancestors(cx.node).map(|a| a.len()).unwrap_or(0);
        let label = cx.tree.label(cx.node).unwrap_or_default();
        let hook = match hook {
            h if h.starts_with("before") => h.yellow(),
            h if h.starts_with("after") => h.cyan(),
            h => h.green().bold(),
        };
        println!("{}{} {}", "  ".repeat(depth), label.bold(), hook);
    }

    fn descendant(&self, cx: &HookCx<'_>, hook: &str, descendant: NodeId) {
        if !self.descendants {
            return;
        }
        let depth = cx.tree.ancestors(cx.node).map(|a| a.len()).unwrap_or(0);
        let label = cx.tree.label(cx.node).unwrap_or_default();
        let other = cx.tree.label(descendant).unwrap_or_default();
        println!(
            "{}{}",
            "  ".repeat(depth),
            format!("{label} {hook}({other})").dimmed()
        );
    }
}

impl Widget for Tracer {
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

fn heading(text: &str) {
    println!("\n{}", format!("== {text}").blue().bold());
}

fn outline(tree: &WidgetTree, root: NodeId) -> Result<()> {
    print!("{}", tree.dump(root)?.dimmed());
    Ok(())
}

pub fn lifecycle(config: TreeConfig, items: usize, verbose: bool) -> Result<()> {
    let tree = WidgetTree::with_config(config);
    let tracer = || Tracer {
        descendants: verbose,
    };

    let menu = tree.insert(NodeBuilder::new(tracer()).label("menu"));
    for index in 0..items {
        let item = tree.insert(NodeBuilder::new(tracer()).label(&format!("item-{index}")));
        tree.add_child(menu, item, None)?;
    }

    heading("attach");
    tree.attach_root(menu, LiveContext::new("screen"), None)
        .context("attaching menu")?;
    if verbose {
        outline(&tree, menu)?;
    }

    heading("add footer to live menu");
    let footer = tree.insert(NodeBuilder::new(tracer()).label("footer"));
    let hint = tree.insert(NodeBuilder::new(tracer()).label("hint"));
    tree.add_child(footer, hint, None)?;
    tree.add_child(menu, footer, None)?;

    heading("remove footer");
    tree.remove_child(menu, footer, None)?;
    if tree.is_disposed(footer)? {
        println!("{}", "footer disposed on detach".magenta());
    }

    heading("detach");
    tree.detach_root(menu, None).context("detaching menu")?;
    if verbose {
        outline(&tree, menu)?;
    }
    Ok(())
}

fn describe(tree: &WidgetTree, host: Option<HostedBy>) -> Result<String> {
    Ok(match host {
        Some(HostedBy::Ancestor(id)) => tree.label(id)?,
        Some(HostedBy::Surface) => "screen".to_string(),
        None => "nowhere".to_string(),
    })
}

pub fn views(config: TreeConfig, capacity: usize, dialogs: usize, verbose: bool) -> Result<()> {
    let tree = WidgetTree::with_config(config);
    let screen = shared(StubHost::new("screen"));
    tree.set_surface(screen.clone());

    let stack = shared(ViewStack::with_capacity(capacity));
    let window = tree.insert(
        NodeBuilder::new(Blank)
            .label("window")
            .view(ViewCapability::new(ViewContent::named("window")).hosting(stack.clone())),
    );
    let body = tree.insert(NodeBuilder::new(Blank).label("body"));
    tree.add_child(window, body, None)?;
    tree.attach_root(window, LiveContext::new("screen"), None)?;

    heading(&format!("open {dialogs} dialogs (window holds {capacity})"));
    let mut opened = Vec::with_capacity(dialogs);
    for index in 0..dialogs {
        let name = format!("dialog-{index}");
        let dialog = tree.insert(
            NodeBuilder::new(Blank)
                .label(&name)
                .view(ViewCapability::new(ViewContent::named(&name))),
        );
        tree.add_child(body, dialog, None)
            .with_context(|| format!("opening {name}"))?;
        let host = describe(&tree, tree.view_host(dialog)?)?;
        println!("{} -> {}", name.bold(), host.green());
        opened.push(dialog);
    }

    println!("window: {:?}", stack.borrow().names());
    println!("screen: {:?}", screen.borrow().shown());
    if verbose {
        outline(&tree, window)?;
    }

    heading("close dialogs");
    for dialog in opened.into_iter().rev() {
        tree.detach_self(dialog, None)?;
    }
    tree.detach_root(window, None)?;
    println!("window: {:?}", stack.borrow().names());
    println!("screen: {:?}", screen.borrow().shown());
    Ok(())
}

pub fn dispose(config: TreeConfig, work_ms: u64, after_ms: u64) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building runtime")?;

    runtime.block_on(async {
        let tree = WidgetTree::with_config(config);
        let loader = tree.insert(NodeBuilder::new(Tracer { descendants: false }).label("loader"));
        let token = tree.dispose_token(loader)?;

        heading(&format!("work takes {work_ms}ms, dispose after {after_ms}ms"));
        let started = Instant::now();
        let work = tokio::spawn(async move {
            run_until_disposed(&token, async {
                tokio::time::sleep(Duration::from_millis(work_ms)).await;
                "payload"
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(after_ms)).await;
        tree.dispose(loader)?;

        match work.await.context("background task panicked")? {
            Ok(value) => println!(
                "{} {} after {:?}",
                "completed".green().bold(),
                value,
                started.elapsed()
            ),
            Err(Interrupted) => println!(
                "{} after {:?}",
                "interrupted".yellow().bold(),
                started.elapsed()
            ),
        }
        Ok::<(), anyhow::Error>(())
    })
}
