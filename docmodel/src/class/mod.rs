// Document classes - schema-backed document types addressed by index into a ClassRegistry

use crate::accessor::FieldAccessor;
use crate::model::ModelId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

/// Shared handle to a registered document class.
pub type ClassRef = Arc<DocumentClass>;

/// Index of a class in its registry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document type: name, owning model and the per-field accessor table.
pub struct DocumentClass {
    id: ClassId,
    name: String,
    anonymous: bool,
    owner: RwLock<Option<ModelId>>,
    accessors: RwLock<HashMap<String, Arc<FieldAccessor>>>,
}

impl DocumentClass {
    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for classes minted by [`ClassRegistry::synthesize_anonymous`].
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// The model governing this class, if one has adopted it.
    pub fn owner(&self) -> Option<ModelId> {
        *self.owner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_owner(&self, model: ModelId) {
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = Some(model);
    }

    /// Resolve the accessor for a field. Hold on to the returned handle to
    /// skip the table lookup on later reads and writes.
    pub fn accessor(&self, field: &str) -> Option<Arc<FieldAccessor>> {
        self.accessors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(field)
            .cloned()
    }

    /// Names of all fields with an installed accessor, sorted.
    pub fn accessor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .accessors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Install an accessor, replacing any previous one for the same field.
    pub(crate) fn install_accessor(&self, accessor: Arc<FieldAccessor>) {
        self.accessors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(accessor.field().to_string(), accessor);
    }
}

impl fmt::Debug for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("anonymous", &self.anonymous)
            .field("owner", &self.owner())
            .field("accessors", &self.accessor_names())
            .finish()
    }
}

#[derive(Default)]
struct ClassTable {
    classes: Vec<ClassRef>,
    by_name: HashMap<String, ClassId>,
    next_anonymous: u64,
}

/// Table of document classes. Entries are never removed, and anonymous
/// names come from a counter that only moves forward.
#[derive(Default)]
pub struct ClassRegistry {
    table: Mutex<ClassTable>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by models that were not given one.
    pub fn global() -> &'static Arc<ClassRegistry> {
        static GLOBAL: OnceLock<Arc<ClassRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ClassRegistry::new()))
    }

    /// Look up a named class, registering it if it does not exist yet.
    pub fn define(&self, name: &str) -> ClassRef {
        let mut table = self.lock();
        if let Some(id) = table.by_name.get(name) {
            return Arc::clone(&table.classes[id.0]);
        }
        insert(&mut table, name.to_string(), false)
    }

    /// Register a fresh class under a name no other class in this registry
    /// has ever used.
    pub fn synthesize_anonymous(&self) -> ClassRef {
        let mut table = self.lock();
        let name = loop {
            table.next_anonymous += 1;
            let candidate = format!("AnonymousDocument{}", table.next_anonymous);
            if !table.by_name.contains_key(&candidate) {
                break candidate;
            }
        };
        let class = insert(&mut table, name, true);
        log::debug!("Synthesized document class {} {}", class.name(), class.id());
        class
    }

    pub fn get(&self, id: ClassId) -> Option<ClassRef> {
        self.lock().classes.get(id.0).cloned()
    }

    pub fn by_name(&self, name: &str) -> Option<ClassRef> {
        let table = self.lock();
        table
            .by_name
            .get(name)
            .map(|id| Arc::clone(&table.classes[id.0]))
    }

    pub fn len(&self) -> usize {
        self.lock().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, ClassTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.lock();
        let names: Vec<&str> = table.classes.iter().map(|c| c.name()).collect();
        f.debug_struct("ClassRegistry")
            .field("classes", &names)
            .field("next_anonymous", &table.next_anonymous)
            .finish()
    }
}

fn insert(table: &mut ClassTable, name: String, anonymous: bool) -> ClassRef {
    let id = ClassId(table.classes.len());
    let class = Arc::new(DocumentClass {
        id,
        name: name.clone(),
        anonymous,
        owner: RwLock::new(None),
        accessors: RwLock::new(HashMap::new()),
    });
    table.classes.push(Arc::clone(&class));
    table.by_name.insert(name, id);
    class
}
