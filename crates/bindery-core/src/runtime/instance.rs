//! Object receivers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A reference-counted object instance.
///
/// Carries the class name it was created for and a type-erased native
/// payload. Bound methods receive their `this` as an `Instance` and downcast
/// the payload to the Rust type they were written against.
#[derive(Clone)]
pub struct Instance {
    class_name: Arc<str>,
    data: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Create an instance of `class_name` wrapping `data`.
    pub fn new<T: Any + Send + Sync>(class_name: impl Into<Arc<str>>, data: T) -> Self {
        Self {
            class_name: class_name.into(),
            data: Arc::new(data),
        }
    }

    /// Name of the class this instance belongs to.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Borrow the native payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}
