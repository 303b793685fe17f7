use std::fmt;
use std::rc::Rc;

use crate::event::Payload;
use crate::store::SimpleStore;

type Callback = dyn Fn(&mut SimpleStore, &Payload);

/// A shared listener callback.
///
/// Clones share the same callback and compare equal under
/// [`Listener::ptr_eq`]; that identity is what `off` removes by.
#[derive(Clone)]
pub struct Listener(Rc<Callback>);

impl Listener {
    pub fn new(callback: impl Fn(&mut SimpleStore, &Payload) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, store: &mut SimpleStore, payload: &Payload) {
        (self.0)(store, payload)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_follows_clones() {
        let a = Listener::new(|_, _| {});
        let b = Listener::new(|_, _| {});
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
