use crate::error::LookupError;
use resmodel_types::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A lookup collaborator for one kind of related resource.
///
/// `get` returns the resolved resource, usually a model wrapped in
/// [`Value::Resource`]. A not-found result is whatever value the collaborator
/// chooses (typically nil); it is cached and returned without inspection.
/// Errors are propagated to the caller unchanged.
pub trait Collection: Send + Sync {
    fn get(&self, identity: &Value) -> Result<Value, LookupError>;
}

impl<F> Collection for F
where
    F: Fn(&Value) -> Result<Value, LookupError> + Send + Sync,
{
    fn get(&self, identity: &Value) -> Result<Value, LookupError> {
        self(identity)
    }
}

/// The owning service of a model, handing out collections by name.
///
/// Associations name the collection they resolve through; the model never
/// constructs collections itself.
pub trait Service: Send + Sync {
    fn collection(&self, name: &str) -> Option<Arc<dyn Collection>>;

    /// Whether `name` is a collection this service provides.
    fn has_collection(&self, name: &str) -> bool {
        self.collection(name).is_some()
    }
}

/// A [`Service`] backed by a fixed table of collections.
#[derive(Clone, Default)]
pub struct Collections {
    entries: HashMap<String, Arc<dyn Collection>>,
}

impl Collections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection under `name`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, collection: impl Collection + 'static) -> Self {
        self.insert(name, collection);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, collection: impl Collection + 'static) {
        self.entries.insert(name.into(), Arc::new(collection));
    }

    /// Collection names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Service for Collections {
    fn collection(&self, name: &str) -> Option<Arc<dyn Collection>> {
        self.entries.get(name).cloned()
    }

    fn has_collection(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl fmt::Debug for Collections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collections")
            .field("names", &self.names())
            .finish()
    }
}
