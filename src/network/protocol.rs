use crate::query::Filter;
use crate::types::{Document, DocumentData};
use serde::{Deserialize, Serialize};

/// Database and collection a request is addressed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub db: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(db: &str, collection: &str) -> Self {
        Self {
            db: db.to_string(),
            collection: collection.to_string(),
        }
    }
}

/// Represents a request sent from a client to the server.
///
/// Frames are a little-endian `u32` length followed by the bincode
/// payload, in both directions.
#[derive(Debug, Serialize, Deserialize)]
pub enum Request {
    /// Remove every document in every collection of a database.
    DropDatabase { db: String },
    /// Insert a document into a collection.
    Insert { ns: Namespace, data: DocumentData },
    /// Insert a batch of documents, one id returned per input.
    InsertMany {
        ns: Namespace,
        batch: Vec<DocumentData>,
    },
    /// First document matching the filter, if any.
    FindOne { ns: Namespace, filter: Filter },
    /// Every document matching the filter.
    Find { ns: Namespace, filter: Filter },
    /// Fetch a document by its id.
    Get { ns: Namespace, id: String },
    /// Overwrite the document with the given id, or insert when id is None.
    Save {
        ns: Namespace,
        id: Option<String>,
        data: DocumentData,
    },
    /// Delete a document by its id.
    Delete { ns: Namespace, id: String },
}

/// Represents a response sent from the server to a client.
#[derive(Debug, Serialize, Deserialize)]
pub enum Response {
    /// The id assigned to a single inserted or saved document.
    Id(String),
    /// The ids assigned to a batch insert, in input order.
    Ids(Vec<String>),
    /// A single document, or None when nothing matched.
    Document(Option<Document>),
    /// Every matching document.
    Documents(Vec<Document>),
    /// A successful operation with no return value.
    Done,
    /// An error occurred.
    Error(String),
}
