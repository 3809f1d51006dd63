//! Native function storage and callable trait.

use std::fmt;
use std::sync::Arc;

use bindery_core::NativeError;

use super::CallContext;

/// Type-erased native implementation.
///
/// Wraps any callable that implements [`NativeCallable`], so implementations
/// of different shapes are stored uniformly. Cloning shares the callable.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap any other [`NativeCallable`] implementor.
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: NativeCallable + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(callable),
        }
    }

    /// Call the implementation with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }

    /// Whether two handles share the same implementation.
    pub fn ptr_eq(a: &NativeFn, b: &NativeFn) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

/// Trait for callable native implementations.
///
/// `call` receives a [`CallContext`] holding the marshalled arguments and
/// the receiver, and stores the result with `set_return`.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::Environment;

    struct Constant(i64);

    impl NativeCallable for Constant {
        fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
            ctx.set_return(self.0);
            Ok(())
        }
    }

    #[test]
    fn closure_and_struct_callables() {
        let env = Environment::new();

        let closure = NativeFn::new(|ctx| {
            ctx.set_return(1i64);
            Ok(())
        });
        let mut ctx = CallContext::new(None, vec![], &env);
        closure.call(&mut ctx).unwrap();
        assert!(ctx.has_return());

        let constant = NativeFn::from_callable(Constant(9));
        let mut ctx = CallContext::new(None, vec![], &env);
        constant.call(&mut ctx).unwrap();
        let ret = ctx.into_return().unwrap();
        assert_eq!(*ret.downcast::<i64>().unwrap(), 9);
    }

    #[test]
    fn clones_share_the_callable() {
        let native = NativeFn::new(|_| Err(NativeError::other("nope")));
        let copy = native.clone();
        assert!(NativeFn::ptr_eq(&native, &copy));
        assert!(format!("{:?}", native).contains("NativeFn"));

        let env = Environment::new();
        let mut ctx = CallContext::new(None, vec![], &env);
        assert!(copy.call(&mut ctx).is_err());
    }
}
