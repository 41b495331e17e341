use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use vesper_db::network::server::Server;
use vesper_db::{
    Client, Document, FieldDefinition, FieldType, Filter, Model, Result, Schema, Value, Vesper,
    VesperConfig,
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
        let text = |field: &str| {
            match doc.data.get(field) {
                Some(Value::String(s)) => s.clone(),
                _ => String::new(),
            }
        };
        let published = match doc.data.get("published") {
            Some(Value::Timestamp(ts)) => *ts,
            _ => Utc::now(),
        };
        Ok(Self {
            id: Some(doc.id.clone()),
            title: text("title"),
            content: text("content"),
            author: text("author"),
            published,
        })
    }
}

fn post_data(title: &str, content: &str, author: &str) -> HashMap<String, Value> {
    let mut data = HashMap::new();
    data.insert("title".to_string(), title.into());
    data.insert("content".to_string(), content.into());
    data.insert("author".to_string(), author.into());
    data
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Run a server in-process so the demo is self-contained
    let temp_dir = tempfile::tempdir()?;
    let db = Arc::new(Vesper::with_config(VesperConfig::with_path(
        temp_dir.path().join("showcase.vesper"),
    ))?);
    let server = Server::bind(db, "127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    tokio::spawn(server.run());

    println!("Connecting to Vesper server...");
    let client = Client::with_uri(&format!("vesper://127.0.0.1:{}", addr.port())).await?;
    println!("Connected!");

    // Start from a clean slate on every run
    client.drop_database("blog").await?;
    let blog = client.database("blog");
    let posts = blog.collection("posts");

    // 1. Insert a single document
    println!("\n1. Inserting a post...");
    let id = posts
        .insert_one(post_data("Rust and Vesper", "Vesper is fun, you guys", "Roy"))
        .await?;
    println!("   -> One post: {}", id);

    // 2. Insert many documents at once
    println!("\n2. Inserting two posts at once...");
    let ids = posts
        .insert_many(vec![
            post_data("Virtual Environments", "Use virtual environments, you guys", "Scott"),
            post_data("Learning Rust", "Learn Rust, it is easy", "Bill"),
        ])
        .await?;
    println!("   -> Multiple posts: {:?}", ids);

    // 3. Retrieve one document by field match
    println!("\n3. Retrieving the post written by Bill...");
    if let Some(doc) = posts.find_one(Filter::new().eq("author", "Bill")).await? {
        println!("   -> {}", doc.to_json());
    }

    // 4. Iterate every matching document
    println!("\n4. Scott's posts:");
    let mut cursor = posts.find(Filter::new().eq("author", "Scott"));
    while let Some(doc) = cursor.try_next().await? {
        println!("   - {}", doc);
    }

    // 5. The schema-validated model layer
    println!("\n5. Saving a Post through its schema...");
    let mut post = Post::new("Sample Post", "Some engaging content", "Scott");
    post.save(&posts).await?;
    println!("   -> {}", post.title);

    post.title = "A Better Post Title".to_string();
    post.save(&posts).await?;
    println!("   -> {}", post.title);

    // 6. Validation rejects bad records before anything is written
    println!("\n6. Trying to save an over-length title...");
    let mut bad = Post::new(&"x".repeat(201), "Some engaging content", "Scott");
    match bad.save(&posts).await {
        Err(e) => println!("   -> Rejected: {}", e),
        Ok(_) => println!("   -> Unexpectedly accepted!"),
    }

    println!("\nShowcase finished.");
    Ok(())
}
