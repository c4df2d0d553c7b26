//! `scope(A) { ... }` installs `A` as the current allocator for the
//! dynamic extent of the block and runs registered cleanups in LIFO
//! order when the block exits, whether normally or by panicking.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::allocator::Allocator;

thread_local! {
    static ALLOCATOR_STACK: RefCell<Vec<Rc<dyn Allocator>>> = RefCell::new(Vec::new());
}

/// The allocator installed by the innermost enclosing [`scope`] call on
/// this thread, if any.
pub fn current_allocator() -> Option<Rc<dyn Allocator>> {
    ALLOCATOR_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Cleanup handle passed to a `scope` body for registering LIFO-order
/// teardown actions.
pub struct Scope {
    cleanups: Vec<Box<dyn FnOnce()>>,
}

impl Scope {
    fn new() -> Self {
        Scope { cleanups: Vec::new() }
    }

    /// Register `f` to run when the scope exits, before cleanups
    /// registered earlier.
    pub fn defer<F: FnOnce() + 'static>(&mut self, f: F) {
        self.cleanups.push(Box::new(f));
    }
}

/// Install `allocator` as the current allocator for `body`'s dynamic
/// extent and run every deferred cleanup in LIFO order on exit, including
/// when `body` panics. A cleanup that itself panics is caught so the
/// remaining cleanups still run; the panic is then re-raised once every
/// cleanup has had a chance to execute, unless `body` was already
/// unwinding, in which case the original panic takes precedence.
pub fn scope<A, F, R>(allocator: Rc<A>, body: F) -> R
where
    A: Allocator + 'static,
    F: FnOnce(&mut Scope) -> R,
{
    ALLOCATOR_STACK.with(|stack| stack.borrow_mut().push(allocator as Rc<dyn Allocator>));

    let mut scope = Scope::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut scope)));

    ALLOCATOR_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });

    let mut cleanup_panicked = false;
    for cleanup in scope.cleanups.into_iter().rev() {
        if panic::catch_unwind(AssertUnwindSafe(cleanup)).is_err() {
            cleanup_panicked = true;
        }
    }

    match result {
        Ok(value) => {
            if cleanup_panicked {
                panic!("scope cleanup panicked");
            }
            value
        }
        Err(payload) => panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FailureStrategy;
    use crate::heap::HeapAllocator;
    use std::cell::Cell;
    use std::rc::Rc as StdRc;

    #[test]
    fn cleanups_run_in_lifo_order() {
        let order: StdRc<RefCell<Vec<u32>>> = StdRc::new(RefCell::new(Vec::new()));
        let a = order.clone();
        let b = order.clone();
        scope(Rc::new(HeapAllocator::new(FailureStrategy::ReturnNull)), |s| {
            s.defer(move || a.borrow_mut().push(1));
            s.defer(move || b.borrow_mut().push(2));
        });
        assert_eq!(*order.borrow(), vec![2, 1]);
    }

    #[test]
    fn current_allocator_is_unset_outside_any_scope() {
        assert!(current_allocator().is_none());
    }

    #[test]
    fn current_allocator_is_visible_inside_the_scope_body() {
        let seen = Cell::new(false);
        scope(Rc::new(HeapAllocator::new(FailureStrategy::ReturnNull)), |_| {
            seen.set(current_allocator().is_some());
        });
        assert!(seen.get());
        assert!(current_allocator().is_none());
    }

    #[test]
    fn cleanups_still_run_when_body_panics() {
        let ran = StdRc::new(Cell::new(false));
        let ran2 = ran.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            scope(Rc::new(HeapAllocator::new(FailureStrategy::ReturnNull)), |s| {
                s.defer(move || ran2.set(true));
                panic!("body blew up");
            })
        }));
        assert!(result.is_err());
        assert!(ran.get());
    }
}
