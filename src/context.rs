use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::keys::EnvironmentKey;

pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Slot {
    pub(crate) name: &'static str,
    pub(crate) value: Erased,
}

/// An immutable snapshot of environment values, keyed by key type.
///
/// Cloning is cheap: the map sits behind an `Arc` and is only copied when a
/// clone is written to. Renderers hand each child its own clone, so a value
/// set for one subtree never leaks into a sibling or an ancestor.
#[derive(Clone, Default)]
pub struct EnvironmentValues {
    inner: Arc<HashMap<TypeId, Slot>>,
}

impl EnvironmentValues {
    pub fn new() -> Self { Self::default() }

    /// Value for `K`, or the key's default when nothing set it.
    pub fn get<K: EnvironmentKey>(&self) -> K::Value {
        self.lookup::<K>().unwrap_or_else(K::default_value)
    }

    /// Value for `K` only if it was explicitly set.
    pub fn lookup<K: EnvironmentKey>(&self) -> Option<K::Value> {
        self.inner
            .get(&TypeId::of::<K>())
            .and_then(|slot| slot.value.downcast_ref::<K::Value>())
            .cloned()
    }

    pub fn contains<K: EnvironmentKey>(&self) -> bool {
        self.inner.contains_key(&TypeId::of::<K>())
    }

    pub fn set<K: EnvironmentKey>(&mut self, value: K::Value) {
        self.insert_slot(TypeId::of::<K>(), K::NAME, Arc::new(value));
    }

    /// Builder form of [`set`](Self::set).
    pub fn with<K: EnvironmentKey>(mut self, value: K::Value) -> Self {
        self.set::<K>(value);
        self
    }

    pub(crate) fn insert_slot(&mut self, id: TypeId, name: &'static str, value: Erased) {
        Arc::make_mut(&mut self.inner).insert(id, Slot { name, value });
    }

    /// A new environment holding `self` with every entry of `scope` laid on top.
    pub fn overlay(&self, scope: &EnvironmentValues) -> Self {
        if scope.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return scope.clone();
        }
        let mut out = self.clone();
        let map = Arc::make_mut(&mut out.inner);
        for (id, slot) in scope.inner.iter() {
            map.insert(*id, slot.clone());
        }
        out
    }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    /// Names of the keys explicitly set, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.values().map(|slot| slot.name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for EnvironmentValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnvironmentValues").field(&self.names()).finish()
    }
}
