//! Shared value cells.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ValueError;

use super::Dynamic;

/// Handle to a runtime value cell.
///
/// Cloning a `Memory` shares the cell: this is how a value is passed by
/// reference. The two copy operations produce independent cells:
///
/// - [`Memory::mutable_copy`] for by-value parameters the callee may modify
/// - [`Memory::immutable_copy`] for by-value parameters the callee must not
///   modify; assignments through the copy fail with [`ValueError::Immutable`]
///
/// The cell also counts active by-reference bindings ([`Memory::check_out`]).
/// The count is informational; it never blocks access.
#[derive(Clone)]
pub struct Memory {
    cell: Arc<Cell>,
}

struct Cell {
    value: RwLock<Dynamic>,
    immutable: bool,
    checkouts: AtomicUsize,
}

impl Memory {
    /// Create a mutable cell holding `value`.
    pub fn new(value: impl Into<Dynamic>) -> Self {
        Self::with_flags(value.into(), false)
    }

    /// Create a cell whose value cannot be reassigned.
    pub fn constant(value: impl Into<Dynamic>) -> Self {
        Self::with_flags(value.into(), true)
    }

    /// Create a mutable cell holding null.
    pub fn null() -> Self {
        Self::new(Dynamic::Null)
    }

    fn with_flags(value: Dynamic, immutable: bool) -> Self {
        Self {
            cell: Arc::new(Cell {
                value: RwLock::new(value),
                immutable,
                checkouts: AtomicUsize::new(0),
            }),
        }
    }

    /// Snapshot of the current payload (shallow for arrays).
    pub fn get(&self) -> Dynamic {
        self.with(Dynamic::clone)
    }

    /// Inspect the payload without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&Dynamic) -> R) -> R {
        let guard = self.cell.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Replace the payload. Visible through every handle sharing this cell.
    pub fn set(&self, value: impl Into<Dynamic>) -> Result<(), ValueError> {
        if self.cell.immutable {
            return Err(ValueError::Immutable);
        }
        let mut guard = self.cell.value.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value.into();
        Ok(())
    }

    /// Independent, immutable copy of this value.
    pub fn immutable_copy(&self) -> Memory {
        Self::with_flags(self.with(|v| v.deep_copy(true)), true)
    }

    /// Independent, mutable copy of this value.
    pub fn mutable_copy(&self) -> Memory {
        Self::with_flags(self.with(|v| v.deep_copy(false)), false)
    }

    /// Whether assignments through this handle are rejected.
    pub fn is_immutable(&self) -> bool {
        self.cell.immutable
    }

    /// Check if the payload is null.
    pub fn is_null(&self) -> bool {
        self.with(Dynamic::is_null)
    }

    /// Type name of the current payload.
    pub fn type_name(&self) -> &'static str {
        self.with(Dynamic::type_name)
    }

    /// Whether two handles share the same cell.
    pub fn ptr_eq(a: &Memory, b: &Memory) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }

    /// Record an active by-reference binding on this cell.
    ///
    /// The binding ends when the returned guard is dropped.
    pub fn check_out(&self) -> Checkout {
        self.cell.checkouts.fetch_add(1, Ordering::AcqRel);
        Checkout {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Whether any by-reference binding is currently active.
    pub fn is_checked_out(&self) -> bool {
        self.cell.checkouts.load(Ordering::Acquire) > 0
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| write!(f, "Memory({:?})", v))
    }
}

/// Compares payloads, not identity. Use [`Memory::ptr_eq`] for identity.
impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        if Memory::ptr_eq(self, other) {
            return true;
        }
        self.get() == other.get()
    }
}

macro_rules! impl_memory_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Memory {
                fn from(value: $ty) -> Self {
                    Memory::new(value)
                }
            }
        )*
    };
}

impl_memory_from!(Dynamic, bool, i64, f64, &str, String, Vec<Memory>, super::Instance);

/// Active by-reference binding of a [`Memory`] cell.
///
/// Checked in again when dropped.
#[must_use = "the binding ends as soon as the guard is dropped"]
pub struct Checkout {
    cell: Arc<Cell>,
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.cell.checkouts.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_cell() {
        let a = Memory::from(1i64);
        let b = a.clone();
        b.set(2i64).unwrap();
        assert_eq!(a.get(), Dynamic::Int(2));
        assert!(Memory::ptr_eq(&a, &b));
    }

    #[test]
    fn mutable_copy_is_independent() {
        let a = Memory::from(1i64);
        let b = a.mutable_copy();
        b.set(2i64).unwrap();
        assert_eq!(a.get(), Dynamic::Int(1));
        assert!(!b.is_immutable());
    }

    #[test]
    fn immutable_copy_rejects_assignment() {
        let a = Memory::from("x");
        let b = a.immutable_copy();
        assert!(b.is_immutable());
        assert_eq!(b.set("y"), Err(ValueError::Immutable));
        assert_eq!(b.get(), Dynamic::String("x".into()));
    }

    #[test]
    fn immutable_copy_of_array_freezes_elements() {
        let a = Memory::from(vec![Memory::from(1i64)]);
        let b = a.immutable_copy();
        let Dynamic::Array(items) = b.get() else {
            panic!("expected array");
        };
        assert!(items[0].is_immutable());
    }

    #[test]
    fn constant_cannot_be_set() {
        let c = Memory::constant(true);
        assert!(c.set(false).is_err());
    }

    #[test]
    fn checkout_is_released_on_drop() {
        let a = Memory::null();
        assert!(!a.is_checked_out());
        {
            let _first = a.check_out();
            let _second = a.clone().check_out();
            assert!(a.is_checked_out());
        }
        assert!(!a.is_checked_out());
    }

    #[test]
    fn equality_compares_payloads() {
        assert_eq!(Memory::from(3i64), Memory::from(3i64));
        assert_ne!(Memory::from(3i64), Memory::from(3.0));
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Memory::from(7i64)), "Memory(Int(7))");
    }
}
