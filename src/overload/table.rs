use std::sync::Arc;

use rustc_hash::FxHashMap;

use bindery_core::BindingError;

use super::Overload;
use crate::conversion::ConversionRegistry;
use crate::native::NativeMethod;

/// Overloads of one callable, at most one per arity.
///
/// At most one overload is variadic. Lookups never mutate the table.
#[derive(Debug, Default, Clone)]
pub struct OverloadTable {
    overloads: FxHashMap<usize, Arc<Overload>>,
    vararg: Option<usize>,
}

impl OverloadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `method` and insert it.
    ///
    /// Classification runs first, so a declaration that fails to bind leaves
    /// the table untouched. When the arity is taken (or a different arity
    /// already holds the vararg overload) the existing overload is returned
    /// with `skip_on_conflict`, otherwise the insertion fails with
    /// [`BindingError::Conflict`].
    pub fn add_overload(
        &mut self,
        owner: &str,
        method: &NativeMethod,
        registry: &ConversionRegistry,
        skip_on_conflict: bool,
    ) -> Result<Arc<Overload>, BindingError> {
        let overload = Overload::bind(owner, method, registry)?;
        self.insert(overload, skip_on_conflict)
    }

    /// Insert an already bound overload. Same conflict rules as
    /// [`add_overload`](Self::add_overload).
    pub fn insert(
        &mut self,
        overload: Overload,
        skip_on_conflict: bool,
    ) -> Result<Arc<Overload>, BindingError> {
        let arity = overload.arity();
        let existing = self.overloads.get(&arity).or_else(|| {
            self.vararg
                .filter(|_| overload.is_vararg())
                .and_then(|other| self.overloads.get(&other))
        });

        if let Some(existing) = existing {
            if skip_on_conflict {
                return Ok(Arc::clone(existing));
            }
            return Err(BindingError::Conflict {
                name: overload.name().to_string(),
                arity,
            });
        }

        if overload.is_vararg() {
            self.vararg = Some(arity);
        }
        let overload = Arc::new(overload);
        self.overloads.insert(arity, Arc::clone(&overload));
        Ok(overload)
    }

    /// The overload a call with `argc` arguments dispatches to.
    ///
    /// An exact arity match wins; otherwise the vararg overload if it
    /// accepts that many arguments.
    pub fn find(&self, argc: usize) -> Option<&Arc<Overload>> {
        self.overloads.get(&argc).or_else(|| {
            self.vararg
                .and_then(|arity| self.overloads.get(&arity))
                .filter(|overload| overload.min_args() <= argc)
        })
    }

    /// The overload registered exactly at `arity`, ignoring varargs.
    pub fn get(&self, arity: usize) -> Option<&Arc<Overload>> {
        self.overloads.get(&arity)
    }

    pub fn remove(&mut self, arity: usize) -> Option<Arc<Overload>> {
        let removed = self.overloads.remove(&arity)?;
        if self.vararg == Some(arity) {
            self.vararg = None;
        }
        Some(removed)
    }

    /// Share every overload of `parent` whose arity is free here.
    ///
    /// The parent's vararg overload is only inherited when this table has
    /// none. Overloads already present are kept.
    pub fn merge(&mut self, parent: &OverloadTable) {
        for (&arity, overload) in &parent.overloads {
            if self.overloads.contains_key(&arity) {
                continue;
            }
            if overload.is_vararg() && self.vararg.is_some() {
                continue;
            }
            if overload.is_vararg() {
                self.vararg = Some(arity);
            }
            self.overloads.insert(arity, Arc::clone(overload));
        }
    }

    /// Smallest number of arguments any overload accepts. Zero when empty.
    pub fn min_args(&self) -> usize {
        self.overloads
            .values()
            .map(|o| o.min_args())
            .min()
            .unwrap_or(0)
    }

    /// Largest number of arguments any overload accepts. `None` when a
    /// vararg overload makes it unbounded or the table is empty.
    pub fn max_args(&self) -> Option<usize> {
        if self.vararg.is_some() {
            return None;
        }
        self.overloads.keys().copied().max()
    }

    /// Arity of the vararg overload, if there is one.
    pub fn vararg_arity(&self) -> Option<usize> {
        self.vararg
    }

    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Registered arities in ascending order.
    pub fn arities(&self) -> Vec<usize> {
        let mut arities: Vec<usize> = self.overloads.keys().copied().collect();
        arities.sort_unstable();
        arities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Overload>> {
        self.overloads.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{CallContext, NativeFn, NativeParam, NativeType};

    fn decl(name: &str, params: Vec<NativeParam>) -> NativeMethod {
        NativeMethod::new(name, NativeFn::new(|_: &mut CallContext<'_>| Ok(()))).params(params)
    }

    fn ints(n: usize) -> Vec<NativeParam> {
        (0..n).map(|_| NativeParam::of::<i64>()).collect()
    }

    fn add(table: &mut OverloadTable, params: Vec<NativeParam>) -> Arc<Overload> {
        table
            .add_overload("", &decl("f", params), &ConversionRegistry::with_builtins(), false)
            .unwrap()
    }

    #[test]
    fn find_prefers_exact_then_vararg() {
        let mut table = OverloadTable::new();
        let a = add(&mut table, ints(1));
        let b = add(&mut table, vec![NativeParam::of::<i64>(), NativeParam::varargs()]);

        assert!(table.find(0).is_none());
        assert!(Arc::ptr_eq(table.find(1).unwrap(), &a));
        assert!(Arc::ptr_eq(table.find(2).unwrap(), &b));
        assert!(Arc::ptr_eq(table.find(5).unwrap(), &b));
        assert_eq!(table.min_args(), 1);
        assert_eq!(table.max_args(), None);
    }

    #[test]
    fn max_args_is_largest_fixed_arity() {
        let mut table = OverloadTable::new();
        add(&mut table, ints(1));
        add(&mut table, ints(3));
        assert_eq!(table.max_args(), Some(3));
    }

    #[test]
    fn conflict_leaves_table_unchanged() {
        let registry = ConversionRegistry::with_builtins();
        let mut table = OverloadTable::new();
        let first = add(&mut table, ints(2));

        let err = table
            .add_overload("", &decl("f", ints(2)), &registry, false)
            .unwrap_err();
        assert_eq!(err, BindingError::Conflict { name: "f".into(), arity: 2 });
        assert_eq!(table.len(), 1);
        assert!(Arc::ptr_eq(table.find(2).unwrap(), &first));

        let kept = table
            .add_overload("", &decl("f", ints(2)), &registry, true)
            .unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[test]
    fn binding_failure_does_not_insert() {
        let mut table = OverloadTable::new();
        let result = table.add_overload(
            "",
            &decl("f", vec![NativeParam::new(NativeType::named("Socket"))]),
            &ConversionRegistry::with_builtins(),
            true,
        );
        assert!(matches!(result, Err(BindingError::UnsupportedType { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn second_vararg_overload_conflicts() {
        let registry = ConversionRegistry::with_builtins();
        let mut table = OverloadTable::new();
        let first = add(&mut table, vec![NativeParam::varargs()]);
        let second = decl("f", vec![NativeParam::of::<i64>(), NativeParam::varargs()]);

        assert!(matches!(
            table.add_overload("", &second, &registry, false),
            Err(BindingError::Conflict { arity: 2, .. })
        ));
        let kept = table.add_overload("", &second, &registry, true).unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
        assert_eq!(table.vararg_arity(), Some(1));
    }

    #[test]
    fn remove_clears_vararg_marker() {
        let mut table = OverloadTable::new();
        add(&mut table, vec![NativeParam::varargs()]);
        assert!(table.find(3).is_some());
        assert!(table.remove(1).is_some());
        assert!(table.find(3).is_none());
        assert_eq!(table.vararg_arity(), None);
        assert!(table.remove(1).is_none());
    }

    #[test]
    fn merge_fills_missing_arities_only() {
        let mut parent = OverloadTable::new();
        let p1 = add(&mut parent, ints(1));
        let p2 = add(&mut parent, ints(2));

        let mut child = OverloadTable::new();
        let c1 = add(&mut child, ints(1));
        child.merge(&parent);

        assert_eq!(child.arities(), vec![1, 2]);
        assert!(Arc::ptr_eq(child.find(1).unwrap(), &c1));
        assert!(!Arc::ptr_eq(child.find(1).unwrap(), &p1));
        assert!(Arc::ptr_eq(child.find(2).unwrap(), &p2));
        assert_eq!(parent.len(), 2);
    }

    #[test]
    fn merge_keeps_own_vararg() {
        let mut parent = OverloadTable::new();
        add(&mut parent, vec![NativeParam::of::<i64>(), NativeParam::varargs()]);

        let mut child = OverloadTable::new();
        let own = add(&mut child, vec![NativeParam::varargs()]);
        child.merge(&parent);

        assert_eq!(child.vararg_arity(), Some(1));
        assert_eq!(child.len(), 1);
        assert!(Arc::ptr_eq(child.find(4).unwrap(), &own));
    }

    #[test]
    fn merge_inherits_vararg_when_absent() {
        let mut parent = OverloadTable::new();
        add(&mut parent, vec![NativeParam::varargs()]);

        let mut child = OverloadTable::new();
        add(&mut child, ints(2));
        child.merge(&parent);

        assert_eq!(child.vararg_arity(), Some(1));
        assert_eq!(child.find(5).unwrap().arity(), 1);
        assert_eq!(child.find(2).unwrap().arity(), 2);
    }

    #[test]
    fn empty_table() {
        let table = OverloadTable::new();
        assert!(table.is_empty());
        assert_eq!(table.min_args(), 0);
        assert_eq!(table.max_args(), None);
        assert!(table.find(0).is_none());
        assert_eq!(table.iter().count(), 0);
    }
}
