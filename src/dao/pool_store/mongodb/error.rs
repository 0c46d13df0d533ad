use mongodb::error::{Error as MongoError, TRANSIENT_TRANSACTION_ERROR};
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB deployment at `{database}` is a standalone server; settlements need a replica set")]
    TransactionsUnsupported { database: String },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to {operation} MongoDB transaction")]
    Transaction {
        operation: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to query collection `{collection}`")]
    Query {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to update collection `{collection}`")]
    Update {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("document `{id}` in `{collection}` holds an invalid identifier")]
    InvalidDocument {
        collection: &'static str,
        id: String,
        #[source]
        source: uuid::Error,
    },
    #[error("{kind} `{id}` referenced by {referenced_by} does not exist")]
    MissingReference {
        kind: &'static str,
        id: Uuid,
        referenced_by: String,
    },
}

impl MongoDaoError {
    /// True when the server aborted the transaction because of a concurrent write.
    pub fn is_transient_transaction_error(&self) -> bool {
        match self {
            MongoDaoError::Transaction { source, .. }
            | MongoDaoError::Query { source, .. }
            | MongoDaoError::Update { source, .. } => {
                source.contains_label(TRANSIENT_TRANSACTION_ERROR)
            }
            _ => false,
        }
    }
}
