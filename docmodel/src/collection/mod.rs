// Collections - connection, factory and handle traits used by Model::new_collection

use crate::error::Result;
use crate::model::Model;
use crate::Options;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque connection to some storage backend. Never inspected here.
pub trait Connection: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// What a collection class receives when asked for a new handle.
pub struct CollectionInit<'a> {
    pub connection: Arc<dyn Connection>,
    pub model: &'a Model,
    pub collection_name: String,
    pub options: Options,
}

/// A handle on the set of documents governed by one model.
pub trait CollectionHandle: fmt::Debug {
    fn connection(&self) -> &Arc<dyn Connection>;

    fn model(&self) -> &Model;

    fn name(&self) -> &str;

    fn options(&self) -> &Options;
}

/// Factory for collection handles. A model holds one of these and calls it
/// from `new_collection`.
pub trait CollectionClass: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn construct<'a>(&self, init: CollectionInit<'a>) -> Result<Box<dyn CollectionHandle + 'a>>;
}

/// Default collection class: binds the handle and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCollectionClass;

impl CollectionClass for GenericCollectionClass {
    fn name(&self) -> &str {
        "GenericCollection"
    }

    fn construct<'a>(&self, init: CollectionInit<'a>) -> Result<Box<dyn CollectionHandle + 'a>> {
        Ok(Box::new(GenericCollection {
            connection: init.connection,
            model: init.model,
            name: init.collection_name,
            options: init.options,
        }))
    }
}

pub struct GenericCollection<'a> {
    connection: Arc<dyn Connection>,
    model: &'a Model,
    name: String,
    options: Options,
}

impl<'a> CollectionHandle for GenericCollection<'a> {
    fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    fn model(&self) -> &Model {
        self.model
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn options(&self) -> &Options {
        &self.options
    }
}

impl<'a> fmt::Debug for GenericCollection<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericCollection")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("connection", &self.connection)
            .field("options", &self.options)
            .finish()
    }
}
