use core::panic::{RefUnwindSafe, UnwindSafe};

use alloc::{boxed::Box, vec, vec::Vec};

use std::sync::{Mutex, MutexGuard};

use crate::pikevm;

/// Search scratch space shared by every search on one compiled program.
pub(crate) type CachePool = Pool<pikevm::Cache, MakeCache>;

pub(crate) type CacheLease<'a> = Lease<'a, pikevm::Cache, MakeCache>;

/// The marker bounds keep `Regex` and `RegexSet` `Send`, `Sync` and unwind
/// safe.
pub(crate) type MakeCache =
    Box<dyn Fn() -> pikevm::Cache + Send + Sync + UnwindSafe + RefUnwindSafe>;

/// A free list of reusable values behind a mutex.
///
/// `get` hands out the most recently returned value, or makes a new one
/// when the list is empty. Sequential searches therefore share a single
/// cache while concurrent ones each get their own.
pub(crate) struct Pool<T, F> {
    free: Mutex<Vec<Box<T>>>,
    make: F,
}

// A value is only ever reachable through one lease.
impl<T: UnwindSafe, F: UnwindSafe> RefUnwindSafe for Pool<T, F> {}

impl<T, F> Pool<T, F> {
    pub(crate) const fn new(make: F) -> Pool<T, F> {
        Pool { free: Mutex::new(vec![]), make }
    }

    /// A panic during a search poisons the lock but leaves the list intact.
    fn free(&self) -> MutexGuard<'_, Vec<Box<T>>> {
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Send, F: Fn() -> T> Pool<T, F> {
    pub(crate) fn get(&self) -> Lease<'_, T, F> {
        let reused = self.free().pop();
        let value = reused.unwrap_or_else(|| Box::new((self.make)()));
        Lease { pool: self, value: Some(value) }
    }
}

impl<T: core::fmt::Debug, F> core::fmt::Debug for Pool<T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool").field("free", &self.free()).finish()
    }
}

/// A value taken from a `Pool`. It goes back on drop.
pub(crate) struct Lease<'a, T: Send, F: Fn() -> T> {
    pool: &'a Pool<T, F>,
    /// Only `None` while dropping.
    value: Option<Box<T>>,
}

impl<'a, T: Send, F: Fn() -> T> Drop for Lease<'a, T, F> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.free().push(value);
        }
    }
}

impl<'a, T: Send, F: Fn() -> T> core::ops::Deref for Lease<'a, T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_deref().expect("lease holds a value until dropped")
    }
}

impl<'a, T: Send, F: Fn() -> T> core::ops::DerefMut for Lease<'a, T, F> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_deref_mut().expect("lease holds a value until dropped")
    }
}

impl<'a, T: Send + core::fmt::Debug, F: Fn() -> T> core::fmt::Debug
    for Lease<'a, T, F>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Lease").field(&self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn values_are_reused() {
        let made = Cell::new(0);
        let pool = Pool::new(|| {
            made.set(made.get() + 1);
            vec![0u8; 4]
        });
        {
            let mut a = pool.get();
            a[0] = 1;
            let b = pool.get();
            assert_eq!(0, b[0]);
        }
        assert_eq!(2, made.get());
        let c = pool.get();
        let d = pool.get();
        assert_eq!(2, made.get());
        // `a` was dropped last, so it comes back first.
        assert_eq!((1, 0), (c[0], d[0]));
    }

    #[test]
    fn shared_across_threads() {
        let pool = Pool::new(|| 0usize);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let mut lease = pool.get();
                    *lease += 1;
                });
            }
        });
        let total: usize = pool.free().iter().map(|v| **v).sum();
        assert_eq!(4, total);
    }
}
