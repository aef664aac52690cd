//! Memoized representation sets.
//!
//! [`build`] returns the same `Arc` for equal fact sets for the lifetime of
//! the process, so callers can compare representation sets by identity.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::mem::{align_of, size_of};
use std::sync::{Arc, Mutex, OnceLock};

use ncbind_core::{Error, Result, debug};

use crate::facts::AbiFactSet;
use crate::layout::{Layout, LayoutKind, LayoutVisitor};

/// One field of a native structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, offset: usize, size: usize) -> Self {
        Self { name, offset, size }
    }
}

/// Shape and identity of one representation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub size: usize,
    pub align: usize,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn of<T: 'static>(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Descriptors for the four representations of one layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutDescriptors {
    pub single_byte: TypeDescriptor,
    pub slot: TypeDescriptor,
    pub wide: TypeDescriptor,
    pub mouse: TypeDescriptor,
}

/// The representations selected for one ABI fact set.
#[derive(Debug)]
pub struct RepresentationSet {
    facts: AbiFactSet,
    kind: LayoutKind,
    descriptors: LayoutDescriptors,
}

impl RepresentationSet {
    #[must_use]
    pub fn facts(&self) -> &AbiFactSet {
        &self.facts
    }

    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    #[must_use]
    pub fn single_byte(&self) -> &TypeDescriptor {
        &self.descriptors.single_byte
    }

    #[must_use]
    pub fn wide_slot(&self) -> &TypeDescriptor {
        &self.descriptors.slot
    }

    #[must_use]
    pub fn wide(&self) -> &TypeDescriptor {
        &self.descriptors.wide
    }

    #[must_use]
    pub fn mouse(&self) -> &TypeDescriptor {
        &self.descriptors.mouse
    }

    /// `true` if `L` is the layout this set was built for.
    #[must_use]
    pub fn is<L: Layout>(&self) -> bool {
        self.descriptors.single_byte.type_id == TypeId::of::<L::Small>()
            && self.descriptors.wide.type_id == TypeId::of::<L::Wide>()
            && self.descriptors.mouse.type_id == TypeId::of::<L::Event>()
    }
}

struct Describe;

impl LayoutVisitor for Describe {
    type Output = LayoutDescriptors;

    fn visit<L: Layout>(self) -> LayoutDescriptors {
        L::descriptors()
    }
}

/// Cache of representation sets keyed by fact set.
#[derive(Debug, Default)]
pub struct Registry {
    sets: Mutex<HashMap<AbiFactSet, Arc<RepresentationSet>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Return the cached set for `facts`, building it on first request.
    ///
    /// Fails with [`Error::CorruptAbi`] if the facts do not describe a
    /// compiled layout; nothing is cached in that case.
    pub fn build(&self, facts: &AbiFactSet) -> Result<Arc<RepresentationSet>> {
        let mut sets = self
            .sets
            .lock()
            .map_err(|_| Error::CorruptAbi("representation registry poisoned".to_owned()))?;
        if let Some(existing) = sets.get(facts) {
            return Ok(Arc::clone(existing));
        }

        let kind = facts.layout_kind()?;
        let set = Arc::new(RepresentationSet {
            facts: facts.clone(),
            kind,
            descriptors: kind.visit(Describe),
        });
        debug!(
            config = facts.config_name,
            layout = kind.as_str(),
            cell_size = set.wide().size,
            "built representation set"
        );
        sets.insert(facts.clone(), Arc::clone(&set));
        Ok(set)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.lock().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build (or fetch) the representation set for `facts` in the global
/// registry.
pub fn build(facts: &AbiFactSet) -> Result<Arc<RepresentationSet>> {
    Registry::global().build(facts)
}
