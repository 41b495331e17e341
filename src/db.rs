use crate::error::{Result, VesperError};
use crate::network::protocol::{Request, Response};
use crate::query::Filter;
use crate::storage::DocStore;
use crate::types::{Document, DocumentData, VesperConfig};
use dashmap::DashMap;
use tracing::debug;

/// The embedded document engine. Documents live under `db:collection:id`
/// keys in the backing store; databases and collections come into being
/// on first write and the registry of per-collection document counts is
/// rebuilt from a full scan on open.
pub struct Vesper {
    store: DocStore,
    collections: DashMap<String, u64>,
}

fn namespace(db: &str, collection: &str) -> Result<String> {
    for (label, name) in [("database", db), ("collection", collection)] {
        if name.is_empty() || name.contains(':') {
            return Err(VesperError::InvalidNamespace(format!(
                "{} name '{}' must be non-empty and must not contain ':'",
                label, name
            )));
        }
    }
    Ok(format!("{}:{}", db, collection))
}

impl Vesper {
    pub fn open(db_path: &str) -> Result<Self> {
        Self::with_config(VesperConfig::with_path(db_path))
    }

    pub fn with_config(config: VesperConfig) -> Result<Self> {
        let engine = Self {
            store: DocStore::open(&config)?,
            collections: DashMap::new(),
        };
        engine.rebuild_registry()?;
        debug!(path = %config.db_path.display(), "engine opened");
        Ok(engine)
    }

    fn rebuild_registry(&self) -> Result<()> {
        for entry in self.store.scan_prefix("") {
            let (key, _) = entry?;
            if let Some((ns, _)) = key.rsplit_once(':') {
                *self.collections.entry(ns.to_string()).or_insert(0) += 1;
            }
        }
        Ok(())
    }

    fn put_document(&self, ns: &str, doc: &Document) -> Result<()> {
        let bytes = bincode::serialize(doc)?;
        self.store.set(&format!("{}:{}", ns, doc.id), bytes)
    }

    /// Inserts a single document and returns its server-assigned id.
    pub fn insert_one(&self, db: &str, collection: &str, data: DocumentData) -> Result<String> {
        let ns = namespace(db, collection)?;
        let doc = Document::new(data);
        self.put_document(&ns, &doc)?;
        *self.collections.entry(ns).or_insert(0) += 1;
        Ok(doc.id)
    }

    /// Inserts a batch of documents, returning one id per input in input
    /// order. Each insert is atomic on its own; there is no batch-level
    /// transaction.
    pub fn insert_many(
        &self,
        db: &str,
        collection: &str,
        batch: Vec<DocumentData>,
    ) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(batch.len());
        for data in batch {
            ids.push(self.insert_one(db, collection, data)?);
        }
        Ok(ids)
    }

    pub fn get_document(&self, db: &str, collection: &str, id: &str) -> Result<Option<Document>> {
        let ns = namespace(db, collection)?;
        match self.store.get(&format!("{}:{}", ns, id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Writes a document under an existing id, or inserts a fresh one when
    /// no id is given. An overwrite replaces the whole document in place.
    pub fn save_document(
        &self,
        db: &str,
        collection: &str,
        id: Option<&str>,
        data: DocumentData,
    ) -> Result<String> {
        let Some(id) = id else {
            return self.insert_one(db, collection, data);
        };
        if id.is_empty() || id.contains(':') {
            return Err(VesperError::InvalidValue(format!(
                "document id '{}' must be non-empty and must not contain ':'",
                id
            )));
        }

        let ns = namespace(db, collection)?;
        let existed = self.store.get(&format!("{}:{}", ns, id))?.is_some();
        let doc = Document {
            id: id.to_string(),
            data,
        };
        self.put_document(&ns, &doc)?;
        if !existed {
            *self.collections.entry(ns).or_insert(0) += 1;
        }
        Ok(doc.id)
    }

    /// Returns the first document matching the filter, scanning no further.
    pub fn find_one(
        &self,
        db: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>> {
        let ns = namespace(db, collection)?;
        let prefix = format!("{}:", ns);
        for entry in self.store.scan_prefix(&prefix) {
            let (_, bytes) = entry?;
            let doc: Document = bincode::deserialize(&bytes)?;
            if filter.matches(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// Returns every document matching the filter, in unspecified order.
    pub fn find(&self, db: &str, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let ns = namespace(db, collection)?;
        let prefix = format!("{}:", ns);
        let mut docs = Vec::new();
        for entry in self.store.scan_prefix(&prefix) {
            let (_, bytes) = entry?;
            let doc: Document = bincode::deserialize(&bytes)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    pub fn delete_document(&self, db: &str, collection: &str, id: &str) -> Result<()> {
        let ns = namespace(db, collection)?;
        let key = format!("{}:{}", ns, id);
        if self.store.get(&key)?.is_some() {
            self.store.delete(&key)?;
            if let Some(mut count) = self.collections.get_mut(&ns) {
                *count = count.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Removes every document in every collection of the database.
    pub fn drop_database(&self, db: &str) -> Result<()> {
        if db.is_empty() || db.contains(':') {
            return Err(VesperError::InvalidNamespace(format!(
                "database name '{}' must be non-empty and must not contain ':'",
                db
            )));
        }

        let prefix = format!("{}:", db);
        let mut keys = Vec::new();
        for entry in self.store.scan_prefix(&prefix) {
            let (key, _) = entry?;
            keys.push(key);
        }
        for key in &keys {
            self.store.delete(key)?;
        }
        self.collections.retain(|ns, _| !ns.starts_with(&prefix));
        debug!(db, removed = keys.len(), "database dropped");
        Ok(())
    }

    /// Names of the collections in a database that hold documents.
    pub fn list_collections(&self, db: &str) -> Vec<String> {
        let prefix = format!("{}:", db);
        let mut names: Vec<String> = self
            .collections
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix) && *entry.value() > 0)
            .map(|entry| entry.key()[prefix.len()..].to_string())
            .collect();
        names.sort();
        names
    }

    pub fn count(&self, db: &str, collection: &str) -> u64 {
        let ns = format!("{}:{}", db, collection);
        self.collections.get(&ns).map(|count| *count).unwrap_or(0)
    }

    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Dispatches a network request against the engine. Errors are folded
    /// into the response so a bad request never tears down the connection.
    pub fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::DropDatabase { db } => match self.drop_database(&db) {
                Ok(()) => Response::Done,
                Err(e) => Response::Error(e.to_string()),
            },
            Request::Insert { ns, data } => {
                match self.insert_one(&ns.db, &ns.collection, data) {
                    Ok(id) => Response::Id(id),
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Request::InsertMany { ns, batch } => {
                match self.insert_many(&ns.db, &ns.collection, batch) {
                    Ok(ids) => Response::Ids(ids),
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Request::FindOne { ns, filter } => {
                match self.find_one(&ns.db, &ns.collection, &filter) {
                    Ok(doc) => Response::Document(doc),
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Request::Find { ns, filter } => match self.find(&ns.db, &ns.collection, &filter) {
                Ok(docs) => Response::Documents(docs),
                Err(e) => Response::Error(e.to_string()),
            },
            Request::Get { ns, id } => match self.get_document(&ns.db, &ns.collection, &id) {
                Ok(doc) => Response::Document(doc),
                Err(e) => Response::Error(e.to_string()),
            },
            Request::Save { ns, id, data } => {
                match self.save_document(&ns.db, &ns.collection, id.as_deref(), data) {
                    Ok(id) => Response::Id(id),
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Request::Delete { ns, id } => {
                match self.delete_document(&ns.db, &ns.collection, &id) {
                    Ok(()) => Response::Done,
                    Err(e) => Response::Error(e.to_string()),
                }
            }
        }
    }
}
