//! Callable entities: the identity of a native function or method plus the
//! overloads registered under it.

use std::fmt;
use std::sync::Arc;

use bindery_core::{BindingError, Environment, Instance, Visibility};

use crate::conversion::{ConversionRegistry, ParameterDescriptor};
use crate::native::{Modifiers, NativeMethod};
use crate::overload::{Overload, OverloadTable};

/// Metadata of the type that declares a method.
pub trait DeclaringType: Send + Sync {
    fn name(&self) -> &str;

    /// Placeholder receiver for a non-static method called without one.
    /// `None` when the type cannot provide one.
    fn new_mock(&self, env: &Environment) -> Option<Instance>;
}

type MockFactory = dyn Fn(&Environment) -> Option<Instance> + Send + Sync;

/// A plain [`DeclaringType`]: a name and an optional mock factory.
pub struct ClassInfo {
    name: String,
    mock: Option<Box<MockFactory>>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mock: None,
        }
    }

    pub fn with_mock<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Environment) -> Option<Instance> + Send + Sync + 'static,
    {
        self.mock = Some(Box::new(factory));
        self
    }
}

impl DeclaringType for ClassInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_mock(&self, env: &Environment) -> Option<Instance> {
        self.mock.as_ref().and_then(|factory| factory(env))
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("has_mock", &self.mock.is_some())
            .finish()
    }
}

/// A named callable backed by native overloads.
///
/// Identity flags come from the most recently accepted declaration; the
/// overload table accumulates across declarations.
pub struct CallableEntity {
    pub(crate) name: String,
    pub(crate) internal_name: String,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) is_final: bool,
    pub(crate) is_deprecated: bool,
    pub(crate) return_reference: bool,
    pub(crate) visibility: Visibility,
    pub(crate) declaring_type: Option<Arc<dyn DeclaringType>>,
    pub(crate) prototype: Option<String>,
    pub(crate) table: OverloadTable,
}

impl CallableEntity {
    /// A free function entity.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            internal_name: name.clone(),
            name,
            is_static: false,
            is_abstract: false,
            is_final: false,
            is_deprecated: false,
            return_reference: false,
            visibility: Visibility::Public,
            declaring_type: None,
            prototype: None,
            table: OverloadTable::new(),
        }
    }

    /// A method entity declared by `declaring_type`.
    pub fn method(name: impl Into<String>, declaring_type: Arc<dyn DeclaringType>) -> Self {
        Self {
            declaring_type: Some(declaring_type),
            ..Self::new(name)
        }
    }

    /// Bind `method` into this entity's table.
    ///
    /// In tolerant mode (`skip_conflicts`) a conflicting arity yields the
    /// overload already there and a declaration with an unsupported type is
    /// skipped with `Ok(None)`. Identity is only updated when the declaration
    /// is newly accepted.
    pub fn add_method(
        &mut self,
        method: NativeMethod,
        registry: &ConversionRegistry,
        skip_conflicts: bool,
    ) -> Result<Option<Arc<Overload>>, BindingError> {
        let owner = self.class_name().unwrap_or_default().to_string();
        let overload = match Overload::bind(&owner, &method, registry) {
            Ok(overload) => overload,
            Err(err) if skip_conflicts => {
                tracing::warn!(
                    owner = %owner,
                    name = %method.name,
                    error = %err,
                    "skipping native declaration"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let before = self.table.len();
        let overload = self.table.insert(overload, skip_conflicts)?;
        if self.table.len() > before {
            self.apply_identity(&method);
        } else {
            tracing::debug!(
                owner = %owner,
                name = %method.name,
                arity = overload.arity(),
                "arity already bound, keeping existing overload"
            );
        }
        Ok(Some(overload))
    }

    fn apply_identity(&mut self, method: &NativeMethod) {
        let modifiers = method.modifiers;
        self.name = method.name.clone();
        self.internal_name = method
            .internal_name
            .clone()
            .unwrap_or_else(|| method.name.clone());
        self.is_static = modifiers.contains(Modifiers::STATIC);
        self.is_abstract = modifiers.contains(Modifiers::ABSTRACT);
        self.is_final = modifiers.contains(Modifiers::FINAL);
        self.is_deprecated = modifiers.contains(Modifiers::DEPRECATED);
        self.return_reference = modifiers.contains(Modifiers::RETURN_REFERENCE);
        self.visibility = if modifiers.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else if modifiers.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::Public
        };
    }

    /// Drop the overload registered at `arity`.
    pub fn remove_overload(&mut self, arity: usize) -> Option<Arc<Overload>> {
        self.table.remove(arity)
    }

    /// Link this entity to the one it overrides and inherit the parent's
    /// overloads for every arity this entity does not define.
    pub fn set_prototype(&mut self, parent: &CallableEntity) {
        self.table.merge(&parent.table);
        self.prototype = Some(parent.signature_string());
    }

    /// Signature of the overridden entity, when a prototype was set.
    pub fn prototype(&self) -> Option<&str> {
        self.prototype.as_deref()
    }

    /// Descriptors of the overload a call with `count` arguments would
    /// reach. Empty when no overload matches.
    pub fn parameters(&self, count: usize) -> &[ParameterDescriptor] {
        self.table
            .find(count)
            .map(|overload| overload.parameters())
            .unwrap_or(&[])
    }

    /// `Class::name` for methods, `name` for free functions.
    pub fn signature_string(&self) -> String {
        match self.class_name() {
            Some(class) => format!("{}::{}", class, self.name),
            None => self.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.declaring_type.as_deref().map(|t| t.name())
    }

    pub fn declaring_type(&self) -> Option<&Arc<dyn DeclaringType>> {
        self.declaring_type.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_deprecated(&self) -> bool {
        self.is_deprecated
    }

    pub fn returns_reference(&self) -> bool {
        self.return_reference
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Always true: every overload is backed by a native implementation.
    pub fn is_native(&self) -> bool {
        true
    }

    pub fn table(&self) -> &OverloadTable {
        &self.table
    }
}

impl fmt::Debug for CallableEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableEntity")
            .field("signature", &self.signature_string())
            .field("static", &self.is_static)
            .field("abstract", &self.is_abstract)
            .field("visibility", &self.visibility)
            .field("arities", &self.table.arities())
            .finish()
    }
}
