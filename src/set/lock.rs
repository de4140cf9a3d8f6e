//! Reader/writer lock used by [`SafeSet`](super::SafeSet).
//!
//! Normal builds use [`parking_lot::RwLock`]. Under `cfg(loom)` the lock is
//! replaced by loom's model-checked lock so the locking discipline of
//! `SafeSet` can be explored exhaustively. Both are exposed through the same
//! `read`/`write` signatures returning plain guards.

#[cfg(not(loom))]
mod imp {
    pub type ReadGuard<'a, T> = parking_lot::RwLockReadGuard<'a, T>;
    pub type WriteGuard<'a, T> = parking_lot::RwLockWriteGuard<'a, T>;

    pub struct RwLock<T>(parking_lot::RwLock<T>);

    impl<T> RwLock<T> {
        #[inline]
        pub const fn new(value: T) -> Self {
            Self(parking_lot::RwLock::new(value))
        }

        #[inline]
        pub fn read(&self) -> ReadGuard<'_, T> {
            self.0.read()
        }

        /// Shared acquisition that does not queue behind waiting writers
        /// while other readers hold the lock.
        #[inline]
        pub fn read_recursive(&self) -> ReadGuard<'_, T> {
            self.0.read_recursive()
        }

        #[inline]
        pub fn write(&self) -> WriteGuard<'_, T> {
            self.0.write()
        }

        #[inline]
        pub fn into_inner(self) -> T {
            self.0.into_inner()
        }
    }
}

#[cfg(loom)]
mod imp {
    use std::sync::PoisonError;

    pub type ReadGuard<'a, T> = loom::sync::RwLockReadGuard<'a, T>;
    pub type WriteGuard<'a, T> = loom::sync::RwLockWriteGuard<'a, T>;

    pub struct RwLock<T>(loom::sync::RwLock<T>);

    // A panicking holder leaves the set in a consistent state (every
    // mutation is a single map call), so poisoning is ignored.
    impl<T> RwLock<T> {
        #[inline]
        pub fn new(value: T) -> Self {
            Self(loom::sync::RwLock::new(value))
        }

        #[inline]
        pub fn read(&self) -> ReadGuard<'_, T> {
            self.0.read().unwrap_or_else(PoisonError::into_inner)
        }

        // loom has no recursive variant.
        #[inline]
        pub fn read_recursive(&self) -> ReadGuard<'_, T> {
            self.read()
        }

        #[inline]
        pub fn write(&self) -> WriteGuard<'_, T> {
            self.0.write().unwrap_or_else(PoisonError::into_inner)
        }

        #[inline]
        pub fn into_inner(self) -> T {
            self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

pub(crate) use imp::RwLock;
