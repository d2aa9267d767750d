use super::{ViewContent, ViewHost};
use std::fmt;

type Filter = Box<dyn Fn(&ViewContent) -> bool>;

/// A hosting slot that keeps shown content in display order.
///
/// It declines content once `capacity` is reached or when the filter rejects
/// it, letting the request travel further up the tree.
#[derive(Default)]
pub struct ViewStack {
    shown: Vec<ViewContent>,
    capacity: Option<usize>,
    filter: Option<Filter>,
}

impl ViewStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn accepting(mut self, filter: impl Fn(&ViewContent) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn contains(&self, content: &ViewContent) -> bool {
        self.shown.iter().any(|c| c.same_as(content))
    }

    pub fn names(&self) -> Vec<String> {
        self.shown.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

impl ViewHost for ViewStack {
    fn try_show(&mut self, content: &ViewContent) -> bool {
        if self.capacity.is_some_and(|cap| self.shown.len() >= cap) {
            return false;
        }
        if let Some(filter) = &self.filter {
            if !filter(content) {
                return false;
            }
        }
        if self.contains(content) {
            return false;
        }
        self.shown.push(content.clone());
        true
    }

    fn try_hide(&mut self, content: &ViewContent) -> bool {
        match self.shown.iter().position(|c| c.same_as(content)) {
            Some(index) => {
                self.shown.remove(index);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ViewStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewStack")
            .field("shown", &self.names())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_hide_in_order() {
        let mut stack = ViewStack::new();
        let a = ViewContent::named("a");
        let b = ViewContent::named("b");

        assert!(stack.try_show(&a));
        assert!(stack.try_show(&b));
        assert_eq!(stack.names(), vec!["a", "b"]);

        // Already shown content is not inserted twice
        assert!(!stack.try_show(&a));

        assert!(stack.try_hide(&a));
        assert!(!stack.try_hide(&a));
        assert_eq!(stack.names(), vec!["b"]);
    }

    #[test]
    fn test_capacity_declines() {
        let mut stack = ViewStack::with_capacity(1);
        assert!(stack.try_show(&ViewContent::named("first")));
        assert!(!stack.try_show(&ViewContent::named("second")));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_filter_declines() {
        let mut stack = ViewStack::new().accepting(|c| c.name().starts_with("dialog"));
        assert!(!stack.try_show(&ViewContent::named("toast")));
        assert!(stack.try_show(&ViewContent::named("dialog-confirm")));
        assert!(!stack.is_empty());
    }
}
