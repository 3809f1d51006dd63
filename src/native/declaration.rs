//! Native member declarations.
//!
//! A [`NativeMethod`] is what a host registers: a name, modifiers, the
//! ordered parameter list, a return type and the implementation. Binding
//! turns it into an [`Overload`](crate::Overload).

use bitflags::bitflags;

use super::{NativeFn, NativeType};

bitflags! {
    /// Modifiers of a native member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        /// Callable without a receiver.
        const STATIC = 1 << 0;
        /// Has no implementation; calling it is an error.
        const ABSTRACT = 1 << 1;
        const FINAL = 1 << 2;
        /// Protected visibility. Public when neither this nor PRIVATE is set.
        const PROTECTED = 1 << 3;
        const PRIVATE = 1 << 4;
        const DEPRECATED = 1 << 5;
        /// The member returns its result by reference.
        const RETURN_REFERENCE = 1 << 6;
    }
}

bitflags! {
    /// Per-parameter annotations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParamFlags: u8 {
        /// Bound to the caller's storage instead of a copy.
        const REFERENCE = 1 << 0;
        /// A by-value runtime value the callee may modify.
        const MUTABLE = 1 << 1;
        /// Null is an acceptable argument.
        const NULLABLE = 1 << 2;
    }
}

/// One parameter of a native declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeParam {
    pub ty: NativeType,
    /// Element type hint for generic containers.
    pub element: Option<NativeType>,
    pub flags: ParamFlags,
}

impl NativeParam {
    pub fn new(ty: NativeType) -> Self {
        Self {
            ty,
            element: None,
            flags: ParamFlags::empty(),
        }
    }

    /// Parameter of Rust type `T`.
    pub fn of<T: bindery_core::TypeName>() -> Self {
        Self::new(NativeType::of::<T>())
    }

    /// A raw runtime value.
    pub fn value() -> Self {
        Self::new(NativeType::value())
    }

    /// A vararg tail of raw runtime values.
    pub fn varargs() -> Self {
        Self::new(NativeType::value_array())
    }

    /// The calling environment, supplied by the binding layer.
    pub fn environment() -> Self {
        Self::new(NativeType::environment())
    }

    /// The call-site location, supplied by the binding layer.
    pub fn trace() -> Self {
        Self::new(NativeType::trace())
    }

    /// Generic container with an element type hint.
    pub fn generic(ty: NativeType, element: NativeType) -> Self {
        Self {
            element: Some(element),
            ..Self::new(ty)
        }
    }

    pub fn reference(mut self) -> Self {
        self.flags |= ParamFlags::REFERENCE;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.flags |= ParamFlags::MUTABLE;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.flags |= ParamFlags::NULLABLE;
        self
    }

    pub fn is_reference(&self) -> bool {
        self.flags.contains(ParamFlags::REFERENCE)
    }

    pub fn is_mutable(&self) -> bool {
        self.flags.contains(ParamFlags::MUTABLE)
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.contains(ParamFlags::NULLABLE)
    }

    /// Whether the parameter is filled by the binding layer rather than
    /// from the caller's arguments.
    pub fn is_injected(&self) -> bool {
        self.ty.is_environment() || self.ty.is_trace()
    }
}

/// A native member declaration ready to be bound.
#[derive(Debug, Clone)]
pub struct NativeMethod {
    pub name: String,
    /// Name the host uses internally, when different from `name`.
    pub internal_name: Option<String>,
    pub modifiers: Modifiers,
    pub params: Vec<NativeParam>,
    pub return_type: NativeType,
    /// Element type hint for a generic return type.
    pub return_element: Option<NativeType>,
    pub function: NativeFn,
}

impl NativeMethod {
    /// A public, non-static member returning nothing.
    pub fn new(name: impl Into<String>, function: NativeFn) -> Self {
        Self {
            name: name.into(),
            internal_name: None,
            modifiers: Modifiers::empty(),
            params: Vec::new(),
            return_type: NativeType::void(),
            return_element: None,
            function,
        }
    }

    pub fn param(mut self, param: NativeParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = NativeParam>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn returns(mut self, ty: NativeType) -> Self {
        self.return_type = ty;
        self.return_element = None;
        self
    }

    pub fn returns_generic(mut self, ty: NativeType, element: NativeType) -> Self {
        self.return_type = ty;
        self.return_element = Some(element);
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn internal_name(mut self, name: impl Into<String>) -> Self {
        self.internal_name = Some(name.into());
        self
    }

    /// Number of parameters that consume caller arguments, vararg tail
    /// included.
    pub fn consuming_params(&self) -> usize {
        self.params.iter().filter(|p| !p.is_injected()).count()
    }
}
