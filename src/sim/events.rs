//! Synchronous listener lists
//!
//! Listeners run in registration order on the caller's thread. Registration
//! hands back an opaque [`ListenerId`] used to unregister later.

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Ordered list of callbacks receiving `E`
pub struct Observers<E> {
    listeners: Vec<(ListenerId, Callback<E>)>,
    next_id: u64,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the handle was already removed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, callback) in self.listeners.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::<u32>::new();

        let a = log.clone();
        observers.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = log.clone();
        observers.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        observers.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe_by_handle() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::<()>::new();

        let c = count.clone();
        let first = observers.subscribe(move |_| *c.borrow_mut() += 1);
        let c = count.clone();
        let _second = observers.subscribe(move |_| *c.borrow_mut() += 10);

        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        observers.emit(&());
        assert_eq!(*count.borrow(), 10);
        assert_eq!(observers.len(), 1);
    }
}
