/// Tree-wide settings, fixed when the tree is created.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    dispose_on_detach: bool,
    log_notifications: bool,
}

impl TreeConfig {
    pub fn new() -> Self {
        Self {
            dispose_on_detach: false,
            log_notifications: false,
        }
    }

    /// Default dispose-on-detach policy for nodes that do not set their own.
    pub fn dispose_on_detach(mut self, dispose: bool) -> Self {
        self.dispose_on_detach = dispose;
        self
    }

    /// Emit a trace event for every hook and observer notification.
    pub fn log_notifications(mut self, enabled: bool) -> Self {
        self.log_notifications = enabled;
        self
    }

    pub fn disposes_on_detach(&self) -> bool {
        self.dispose_on_detach
    }

    pub fn logs_notifications(&self) -> bool {
        self.log_notifications
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
