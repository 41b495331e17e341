use crate::cursor::Cursor;
use crate::error::{Result, VesperError};
use crate::network::protocol::{Namespace, Request, Response};
use crate::query::Filter;
use crate::types::{Document, DocumentData};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;

const URI_SCHEME: &str = "vesper://";

struct Connection {
    stream: TcpStream,
}

impl Connection {
    /// Sends a request to the server and awaits a response.
    async fn send_request(&mut self, request: &Request) -> Result<Response> {
        let request_bytes = bincode::serialize(request).map_err(VesperError::Bincode)?;
        let len_bytes = (request_bytes.len() as u32).to_le_bytes();

        self.stream.write_all(&len_bytes).await?;
        self.stream.write_all(&request_bytes).await?;

        let mut len_bytes = [0u8; 4];
        self.stream.read_exact(&mut len_bytes).await?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let mut buffer = vec![0u8; len];
        self.stream.read_exact(&mut buffer).await?;

        let response: Response = bincode::deserialize(&buffer).map_err(VesperError::Bincode)?;

        Ok(response)
    }
}

/// Session handle to a Vesper server. Cheap to clone; every clone shares
/// the underlying connection and requests on it run one at a time.
#[derive(Clone)]
pub struct Client {
    conn: Arc<Mutex<Connection>>,
}

impl Client {
    /// Connect to a server at the given host and port.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Connection { stream })),
        })
    }

    /// Connect to `localhost` on the default port.
    pub async fn connect_default() -> Result<Self> {
        Self::connect(DEFAULT_HOST, DEFAULT_PORT).await
    }

    /// Connect using a URI of the form `vesper://host:port`. The port may
    /// be omitted, in which case the default is used.
    pub async fn with_uri(uri: &str) -> Result<Self> {
        let (host, port) = parse_uri(uri)?;
        Self::connect(&host, port).await
    }

    pub(crate) async fn request(&self, request: Request) -> Result<Response> {
        let mut conn = self.conn.lock().await;
        conn.send_request(&request).await
    }

    /// Handle to a named database. No round trip happens here; the
    /// database comes into being once data is written to it.
    pub fn database(&self, name: &str) -> Database {
        Database {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    /// Remove every document in every collection of the database.
    pub async fn drop_database(&self, name: &str) -> Result<()> {
        let request = Request::DropDatabase {
            db: name.to_string(),
        };
        match self.request(request).await? {
            Response::Done => Ok(()),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }
}

fn parse_uri(uri: &str) -> Result<(String, u16)> {
    let rest = uri
        .strip_prefix(URI_SCHEME)
        .ok_or_else(|| VesperError::InvalidUri(format!("expected '{}...', got '{}'", URI_SCHEME, uri)))?;

    let (host, port) = match rest.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| VesperError::InvalidUri(format!("invalid port in '{}'", uri)))?;
            (host, port)
        }
        None => (rest, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(VesperError::InvalidUri(format!("missing host in '{}'", uri)));
    }
    Ok((host.to_string(), port))
}

/// Handle to a named database on a server.
#[derive(Clone)]
pub struct Database {
    client: Client,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to a named collection. Like the database itself, the
    /// collection is created implicitly on first write.
    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            client: self.client.clone(),
            ns: Namespace::new(&self.name, name),
        }
    }
}

/// Handle to a named collection of documents.
#[derive(Clone)]
pub struct Collection {
    client: Client,
    ns: Namespace,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.ns.collection
    }

    /// Inserts a single document and returns its server-assigned id.
    pub async fn insert_one(&self, data: DocumentData) -> Result<String> {
        let request = Request::Insert {
            ns: self.ns.clone(),
            data,
        };
        match self.client.request(request).await? {
            Response::Id(id) => Ok(id),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    /// Inserts a batch of documents, returning one id per input in input
    /// order.
    pub async fn insert_many(&self, batch: Vec<DocumentData>) -> Result<Vec<String>> {
        let request = Request::InsertMany {
            ns: self.ns.clone(),
            batch,
        };
        match self.client.request(request).await? {
            Response::Ids(ids) => Ok(ids),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    /// First document matching the filter, or None. A filter that matches
    /// nothing is not an error.
    pub async fn find_one(&self, filter: Filter) -> Result<Option<Document>> {
        let request = Request::FindOne {
            ns: self.ns.clone(),
            filter,
        };
        match self.client.request(request).await? {
            Response::Document(doc) => Ok(doc),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    /// Lazy cursor over the documents matching the filter. Nothing is sent
    /// to the server until the cursor is first polled, and every call
    /// produces a fresh cursor that re-runs the query.
    pub fn find(&self, filter: Filter) -> Cursor {
        Cursor::new(self.clone(), filter)
    }

    pub(crate) async fn fetch_matching(&self, filter: &Filter) -> Result<Vec<Document>> {
        let request = Request::Find {
            ns: self.ns.clone(),
            filter: filter.clone(),
        };
        match self.client.request(request).await? {
            Response::Documents(docs) => Ok(docs),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    /// Fetch a document by its id.
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        let request = Request::Get {
            ns: self.ns.clone(),
            id: id.to_string(),
        };
        match self.client.request(request).await? {
            Response::Document(doc) => Ok(doc),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    /// Overwrites the document with the given id, or inserts a fresh one
    /// when no id is given. Returns the id either way.
    pub async fn save(&self, id: Option<&str>, data: DocumentData) -> Result<String> {
        let request = Request::Save {
            ns: self.ns.clone(),
            id: id.map(str::to_string),
            data,
        };
        match self.client.request(request).await? {
            Response::Id(id) => Ok(id),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = Request::Delete {
            ns: self.ns.clone(),
            id: id.to_string(),
        };
        match self.client.request(request).await? {
            Response::Done => Ok(()),
            Response::Error(e) => Err(VesperError::Protocol(e)),
            _ => Err(VesperError::Protocol("Unexpected response".into())),
        }
    }
}
