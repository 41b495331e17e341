use crate::client::Collection;
use crate::error::Result;
use crate::query::Filter;
use crate::schema::Schema;
use crate::types::{Document, DocumentData};

/// Class-based view over a collection: a typed record with a schema that
/// is validated on every save.
///
/// Implementors supply the collection name, the schema, id accessors,
/// and the conversions to and from a raw document. `save` is provided:
/// it applies schema defaults, validates, and upserts. Validation runs
/// before anything is sent, so a failed save never leaves a partial
/// write behind — the record keeps whatever state it had.
///
/// ```ignore
/// let mut post = Post::new("Sample Post", "Some engaging content", "Scott");
/// post.save(&posts).await?;          // insert, id assigned
/// post.title = "A Better Post Title".to_string();
/// post.save(&posts).await?;          // overwrites the stored document
/// ```
#[allow(async_fn_in_trait)]
pub trait Model: Sized {
    /// Collection the records of this type are stored in.
    const COLLECTION: &'static str;

    fn schema() -> Schema;

    /// The persisted id, or None while the record is unsaved.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    fn to_data(&self) -> DocumentData;

    fn from_document(doc: &Document) -> Result<Self>;

    /// Validates the record and writes it to the collection.
    ///
    /// An unsaved record is inserted and remembers its assigned id; a
    /// persisted one has its stored fields overwritten in place.
    async fn save(&mut self, collection: &Collection) -> Result<()> {
        let schema = Self::schema();
        let mut data = self.to_data();
        schema.apply_defaults(&mut data);
        schema.validate(&data)?;

        let id = collection.save(self.id(), data).await?;
        self.set_id(id);
        Ok(())
    }

    /// First record matching the filter, decoded into the model type.
    async fn find_one(collection: &Collection, filter: Filter) -> Result<Option<Self>> {
        match collection.find_one(filter).await? {
            Some(doc) => Ok(Some(Self::from_document(&doc)?)),
            None => Ok(None),
        }
    }
}
