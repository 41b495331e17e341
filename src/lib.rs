//! An embedded document database with a typed async client, a
//! schema-validated model layer, and a binary network server.
//!
//! Documents are schemaless field maps grouped into collections inside
//! named databases, created implicitly on first write. The [`Model`]
//! trait layers typed, validated records on top of raw documents.

pub mod client;
pub mod cursor;
pub mod db;
pub mod error;
pub mod model;
pub mod network;
pub mod query;
pub mod schema;
pub mod storage;
pub mod types;

pub use client::{Client, Collection, Database};
pub use cursor::Cursor;
pub use db::Vesper;
pub use error::{Result, ValidationError, VesperError};
pub use model::Model;
pub use query::Filter;
pub use schema::{FieldDefault, FieldDefinition, FieldType, Schema};
pub use types::{Document, DocumentData, StoreMode, Value, VesperConfig};
