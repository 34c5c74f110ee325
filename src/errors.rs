use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Server error codes the bootstrap procedure knows how to classify.
mod codes {
    pub const BAD_VALUE: i32 = 2;
    pub const UNAUTHORIZED: i32 = 13;
    pub const AUTHENTICATION_FAILED: i32 = 18;
    pub const NAMESPACE_EXISTS: i32 = 48;
    pub const CANNOT_CREATE_INDEX: i32 = 67;
    pub const INDEX_ALREADY_EXISTS: i32 = 68;
    pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
    pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
    pub const INVALID_INDEX_SPECIFICATION_OPTION: i32 = 197;
    pub const USER_ALREADY_EXISTS: i32 = 51003;
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("DATABASE_URL or MONGODB_URL must be set")]
    MissingUrl,
    #[error("connection string is empty")]
    EmptyUrl,
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error("could not reach the database server")]
    Connection(#[source] MongoError),
    #[error("not authorized to provision the database")]
    Authentication(#[source] MongoError),
    #[error("user {user} already exists on {db}")]
    UserExists {
        user: String,
        db: String,
        #[source]
        source: MongoError,
    },
    #[error("collection {namespace} already exists")]
    CollectionExists {
        namespace: String,
        #[source]
        source: MongoError,
    },
    #[error("conflicting index on {namespace}.{field}")]
    IndexConflict {
        namespace: String,
        field: String,
        #[source]
        source: MongoError,
    },
    #[error("server rejected options for {target}")]
    InvalidOptions {
        target: String,
        #[source]
        source: MongoError,
    },
    #[error("database error")]
    Database(#[source] MongoError),
    #[error("failed to write to output stream")]
    Output(#[from] std::io::Error),
}

/// Which administrative call produced a driver error.
///
/// Only used to fill in the resource names of the classified error.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Connect,
    CreateUser { db: &'a str, user: &'a str },
    CreateCollection { db: &'a str, name: &'a str },
    CreateIndex { db: &'a str, collection: &'a str, field: &'a str },
}

/// Server-side error code carried by a driver error, if any.
pub fn server_code(error: &MongoError) -> Option<i32> {
    match error.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => Some(concern.code),
        _ => None,
    }
}

/// Whether a driver error is a duplicate key violation (E11000).
pub fn is_duplicate_key(error: &MongoError) -> bool {
    server_code(error) == Some(11000)
}

impl BootstrapError {
    /// Classify a driver error raised by `op`.
    pub fn from_driver(op: Operation<'_>, source: MongoError) -> Self {
        let kind = source.kind.as_ref();
        if matches!(kind, ErrorKind::Authentication { .. }) {
            return Self::Authentication(source);
        }
        let unreachable = matches!(
            kind,
            ErrorKind::ServerSelection { .. }
                | ErrorKind::Io(_)
                | ErrorKind::DnsResolve { .. }
                | ErrorKind::ConnectionPoolCleared { .. }
        ) || (matches!(op, Operation::Connect)
            && matches!(kind, ErrorKind::InvalidArgument { .. }));
        if unreachable {
            return Self::Connection(source);
        }

        match (server_code(&source), op) {
            (Some(codes::UNAUTHORIZED | codes::AUTHENTICATION_FAILED), _) => {
                Self::Authentication(source)
            }
            (Some(codes::USER_ALREADY_EXISTS), Operation::CreateUser { db, user }) => {
                Self::UserExists {
                    user: user.to_string(),
                    db: db.to_string(),
                    source,
                }
            }
            (Some(codes::NAMESPACE_EXISTS), Operation::CreateCollection { db, name }) => {
                Self::CollectionExists {
                    namespace: format!("{db}.{name}"),
                    source,
                }
            }
            (
                Some(
                    codes::INDEX_ALREADY_EXISTS
                    | codes::INDEX_OPTIONS_CONFLICT
                    | codes::INDEX_KEY_SPECS_CONFLICT,
                ),
                Operation::CreateIndex {
                    db,
                    collection,
                    field,
                },
            ) => Self::IndexConflict {
                namespace: format!("{db}.{collection}"),
                field: field.to_string(),
                source,
            },
            (
                Some(
                    codes::BAD_VALUE
                    | codes::CANNOT_CREATE_INDEX
                    | codes::INVALID_INDEX_SPECIFICATION_OPTION,
                ),
                op,
            ) => Self::InvalidOptions {
                target: op.target(),
                source,
            },
            _ => Self::Database(source),
        }
    }

    /// Duplicate-resource errors: the procedure already ran against this server.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::UserExists { .. } | Self::CollectionExists { .. } | Self::IndexConflict { .. }
        )
    }
}

impl Operation<'_> {
    fn target(&self) -> String {
        match self {
            Operation::Connect => "connection".to_string(),
            Operation::CreateUser { db, user } => format!("user {user} on {db}"),
            Operation::CreateCollection { db, name } => format!("collection {db}.{name}"),
            Operation::CreateIndex {
                db,
                collection,
                field,
            } => format!("index {db}.{collection}.{field}"),
        }
    }
}
