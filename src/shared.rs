//! Reference-typed keys and identity comparison.
//!
//! `Shared<T>` is a cloneable handle to one mutable value. Clones are the
//! same key under [`Identity`]; two handles to equal-looking but separately
//! allocated values are different keys. `Shared` deliberately implements no
//! `Eq`, `Hash` or `Ord`, so default resolution lands on identity.
//!
//! Because the value behind the handle can be mutated while the handle sits
//! in a container, `Shared` is also how the mutable key hazard shows up: a
//! strategy that looks *through* the handle (e.g. by name) sees the new state
//! while the container's index still reflects the old one.

use crate::strategy::{mix64, EqualityStrategy};
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;
use std::sync::Arc;

pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    /// Panics if the value is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Panics if the value is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Stable per-allocation token; equal for all clones, unique among live
    /// handles.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(v) => f.debug_tuple("Shared").field(&*v).finish(),
            Err(_) => f.write_str("Shared(<borrowed>)"),
        }
    }
}

/// Equality by allocation address, hash by the same address.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<T> EqualityStrategy<Shared<T>> for Identity {
    #[inline]
    fn equals(&self, a: &Shared<T>, b: &Shared<T>) -> bool {
        Shared::ptr_eq(a, b)
    }
    #[inline]
    fn hash(&self, key: &Shared<T>) -> u64 {
        mix64(key.identity() as u64)
    }
}

impl<T: ?Sized> EqualityStrategy<Rc<T>> for Identity {
    #[inline]
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
    #[inline]
    fn hash(&self, key: &Rc<T>) -> u64 {
        mix64(Rc::as_ptr(key) as *const () as usize as u64)
    }
}

impl<T: ?Sized> EqualityStrategy<Arc<T>> for Identity {
    #[inline]
    fn equals(&self, a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
    #[inline]
    fn hash(&self, key: &Arc<T>) -> u64 {
        mix64(Arc::as_ptr(key) as *const () as usize as u64)
    }
}
