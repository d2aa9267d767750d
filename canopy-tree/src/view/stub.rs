use super::{ViewContent, ViewHost};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::debug;

/// Debug/testing host that accepts everything and logs what it is asked to do.
///
/// It does not display anything. Use it as a tree surface while developing,
/// or hand it a buffer to assert on the show/hide sequence in tests.
pub struct StubHost {
    name: String,
    /// Content currently shown, in show order
    shown: Vec<ViewContent>,
    /// Start time for timestamps
    start_time: Instant,
    /// Optional log buffer for testing
    log_buffer: Option<Rc<RefCell<Vec<String>>>>,
}

impl StubHost {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shown: Vec::new(),
            start_time: Instant::now(),
            log_buffer: None,
        }
    }

    /// Create a StubHost that also records every operation into `buffer`
    pub fn with_buffer(name: &str, buffer: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            log_buffer: Some(buffer),
            ..Self::new(name)
        }
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.iter().map(|c| c.name().to_string()).collect()
    }

    fn log(&self, msg: String) {
        let elapsed = self.start_time.elapsed();
        debug!(host = %self.name, at = elapsed.as_secs_f64(), "{}", msg);
        if let Some(buffer) = &self.log_buffer {
            buffer.borrow_mut().push(msg);
        }
    }
}

impl ViewHost for StubHost {
    fn try_show(&mut self, content: &ViewContent) -> bool {
        self.shown.push(content.clone());
        self.log(format!("{}: show {}", self.name, content.name()));
        true
    }

    fn try_hide(&mut self, content: &ViewContent) -> bool {
        let Some(index) = self.shown.iter().position(|c| c.same_as(content)) else {
            self.log(format!("{}: hide {} (not shown)", self.name, content.name()));
            return false;
        };
        self.shown.remove(index);
        self.log(format!("{}: hide {}", self.name, content.name()));
        true
    }
}
