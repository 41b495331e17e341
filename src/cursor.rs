use crate::client::Collection;
use crate::error::Result;
use crate::query::Filter;
use crate::types::Document;
use std::collections::VecDeque;

/// Lazy handle over the results of [`Collection::find`].
///
/// The query is not sent until the cursor is first polled. Results are
/// buffered client-side after that one fetch, so a cursor sees the
/// collection as it was when polling began.
pub struct Cursor {
    collection: Collection,
    filter: Filter,
    buffer: Option<VecDeque<Document>>,
}

impl Cursor {
    pub(crate) fn new(collection: Collection, filter: Filter) -> Self {
        Self {
            collection,
            filter,
            buffer: None,
        }
    }

    /// Advances the cursor, running the query on first use.
    pub async fn try_next(&mut self) -> Result<Option<Document>> {
        if self.buffer.is_none() {
            let docs = self.collection.fetch_matching(&self.filter).await?;
            self.buffer = Some(docs.into());
        }
        match self.buffer.as_mut() {
            Some(buffer) => Ok(buffer.pop_front()),
            None => Ok(None),
        }
    }

    /// Drains the remaining results into a vector.
    pub async fn collect(mut self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        while let Some(doc) = self.try_next().await? {
            docs.push(doc);
        }
        Ok(docs)
    }
}
