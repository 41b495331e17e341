use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use vesper_db::network::server::Server;
use vesper_db::{
    Client, Document, FieldDefinition, FieldType, Filter, Model, Result, Schema,
    ValidationError, Value, Vesper, VesperConfig, VesperError,
};

#[derive(Debug, Clone)]
struct Post {
    id: Option<String>,
    title: String,
    content: String,
    author: String,
    published: DateTime<Utc>,
}

impl Post {
    fn new(title: &str, content: &str, author: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            published: Utc::now(),
        }
    }
}

impl Model for Post {
    const COLLECTION: &'static str = "posts";

    fn schema() -> Schema {
        Schema::new()
            .field(
                "title",
                FieldDefinition::new(FieldType::String).required().max_length(200),
            )
            .field("content", FieldDefinition::new(FieldType::String).required())
            .field(
                "author",
                FieldDefinition::new(FieldType::String).required().max_length(50),
            )
            .field(
                "published",
                FieldDefinition::new(FieldType::Timestamp).default_now(),
            )
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn to_data(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("title".to_string(), self.title.as_str().into());
        data.insert("content".to_string(), self.content.as_str().into());
        data.insert("author".to_string(), self.author.as_str().into());
        data.insert("published".to_string(), Value::Timestamp(self.published));
        data
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let string_field = |field: &str| -> Result<String> {
            match doc.data.get(field) {
                Some(Value::String(s)) => Ok(s.clone()),
                other => Err(VesperError::InvalidValue(format!(
                    "expected string field '{}', got {:?}",
                    field, other
                ))),
            }
        };
        let published = match doc.data.get("published") {
            Some(Value::Timestamp(ts)) => *ts,
            other => {
                return Err(VesperError::InvalidValue(format!(
                    "expected timestamp field 'published', got {:?}",
                    other
                )));
            }
        };

        Ok(Self {
            id: Some(doc.id.clone()),
            title: string_field("title")?,
            content: string_field("content")?,
            author: string_field("author")?,
            published,
        })
    }
}

async fn spawn_server() -> (Client, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("server.vesper");

    let db = Arc::new(Vesper::with_config(VesperConfig::with_path(db_path)).unwrap());
    let server = Server::bind(db, "127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let client = Client::connect(&addr.ip().to_string(), addr.port())
        .await
        .unwrap();
    (client, temp_dir)
}

#[tokio::test]
async fn test_save_then_fetch_by_id_returns_equal_fields() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Sample Post", "Some engaging content", "Scott");
    assert!(post.id().is_none());
    post.save(&posts).await.unwrap();

    let id = post.id().expect("save assigns an id").to_string();
    let doc = posts.get(&id).await.unwrap().unwrap();
    let fetched = Post::from_document(&doc).unwrap();

    assert_eq!(fetched.title, post.title);
    assert_eq!(fetched.content, post.content);
    assert_eq!(fetched.author, post.author);
    assert_eq!(fetched.published, post.published);
}

#[tokio::test]
async fn test_second_save_overwrites_same_document() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Sample Post", "Some engaging content", "Scott");
    post.save(&posts).await.unwrap();
    let first_id = post.id().unwrap().to_string();

    post.title = "A Better Post Title".to_string();
    post.save(&posts).await.unwrap();
    assert_eq!(post.id().unwrap(), first_id);

    let all = posts.find(Filter::new()).collect().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(
        all[0].data.get("title"),
        Some(&Value::String("A Better Post Title".to_string()))
    );
}

#[tokio::test]
async fn test_empty_required_field_fails_and_persists_nothing() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Sample Post", "", "Scott");
    let err = post.save(&posts).await.unwrap_err();

    match err {
        VesperError::Validation(ValidationError::EmptyField(field)) => {
            assert_eq!(field, "content");
        }
        other => panic!("expected empty-field validation error, got {other:?}"),
    }
    assert!(post.id().is_none(), "failed save must not assign an id");
    assert!(posts.find(Filter::new()).collect().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_over_length_title_fails_and_persists_nothing() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new(&"x".repeat(201), "Some engaging content", "Scott");
    let err = post.save(&posts).await.unwrap_err();

    match err {
        VesperError::Validation(ValidationError::TooLong { field, len, max }) => {
            assert_eq!(field, "title");
            assert_eq!(len, 201);
            assert_eq!(max, 200);
        }
        other => panic!("expected too-long validation error, got {other:?}"),
    }
    assert!(posts.find(Filter::new()).collect().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_over_length_author_fails() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Sample Post", "Some engaging content", &"a".repeat(51));
    let err = post.save(&posts).await.unwrap_err();
    assert!(matches!(
        err,
        VesperError::Validation(ValidationError::TooLong { max: 50, .. })
    ));
}

#[tokio::test]
async fn test_failed_save_keeps_previous_persisted_state() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Sample Post", "Some engaging content", "Scott");
    post.save(&posts).await.unwrap();
    let id = post.id().unwrap().to_string();

    post.title = "x".repeat(201);
    assert!(post.save(&posts).await.is_err());

    let doc = posts.get(&id).await.unwrap().unwrap();
    assert_eq!(
        doc.data.get("title"),
        Some(&Value::String("Sample Post".to_string())),
        "stored document must be untouched by the failed save"
    );
}

#[tokio::test]
async fn test_find_one_decodes_into_model() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    let mut post = Post::new("Learning Rust", "Learn Rust, it is easy", "Bill");
    post.save(&posts).await.unwrap();

    let found = Post::find_one(&posts, Filter::new().eq("author", "Bill"))
        .await
        .unwrap()
        .expect("saved post should be found");
    assert_eq!(found.id, post.id);
    assert_eq!(found.title, "Learning Rust");

    let missing = Post::find_one(&posts, Filter::new().eq("author", "Nobody"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_raw_save_applies_published_default() {
    let (client, _guard) = spawn_server().await;
    let posts = client.database("blog").collection(Post::COLLECTION);

    // Going through the schema by hand, the way a driver-level caller would
    let schema = Post::schema();
    let mut data = HashMap::new();
    data.insert("title".to_string(), "Sample Post".into());
    data.insert("content".to_string(), "Some engaging content".into());
    data.insert("author".to_string(), "Scott".into());
    schema.apply_defaults(&mut data);
    schema.validate(&data).unwrap();

    let id = posts.save(None, data).await.unwrap();
    let doc = posts.get(&id).await.unwrap().unwrap();
    assert!(matches!(doc.data.get("published"), Some(Value::Timestamp(_))));
}
