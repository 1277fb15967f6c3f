use kkm_codec::CodecError;
use kkm_errlog::ErrorType;
use kkm_reconcile::ShipStatsPlanError;
use thiserror::Error;

use crate::ResponseCode;

/// Failure inside one reconciliation transaction.
///
/// `Codec` escapes the public boundary as a hard failure; the other variants
/// are converted into error outcomes there.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("datastore error: {0}")]
    Datastore(#[from] sqlx::Error),

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl From<ShipStatsPlanError> for ReconcileError {
    fn from(err: ShipStatsPlanError) -> Self {
        match err {
            ShipStatsPlanError::Codec(e) => ReconcileError::Codec(e),
            other => ReconcileError::Generic(anyhow::Error::new(other)),
        }
    }
}

impl ReconcileError {
    pub fn datastore_kind(&self) -> Option<DatastoreErrorKind> {
        match self {
            ReconcileError::Datastore(e) => Some(DatastoreErrorKind::of(e)),
            _ => None,
        }
    }

    pub fn response_code(&self) -> ResponseCode {
        match self.datastore_kind() {
            Some(kind) => kind.response_code(),
            None => ResponseCode::ProgramError,
        }
    }

    pub fn error_name(&self) -> &'static str {
        match self {
            ReconcileError::Codec(e) if e.is_range() => "RangeError",
            ReconcileError::Codec(_) => "FormatError",
            ReconcileError::Datastore(e) => DatastoreErrorKind::of(e).name(),
            ReconcileError::Generic(_) => "GenericError",
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            ReconcileError::Datastore(_) => ErrorType::Database,
            _ => ErrorType::Program,
        }
    }

    /// Diagnostic text for the error log, including SQLSTATE when present.
    pub fn details(&self) -> String {
        match self {
            ReconcileError::Datastore(sqlx::Error::Database(db)) => match db.code() {
                Some(code) => format!("SQLSTATE {code}: {}", db.message()),
                None => db.message().to_string(),
            },
            ReconcileError::Generic(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

/// Datastore error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatastoreErrorKind {
    /// Bad statement or row contract (syntax, unknown column, decode).
    Programming,
    /// Connection, pool, resource or transaction-abort trouble.
    Operational,
    /// Constraint violation.
    Integrity,
    Generic,
}

impl DatastoreErrorKind {
    pub fn of(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => match db.code() {
                Some(code) => classify_sqlstate(&code),
                None => DatastoreErrorKind::Generic,
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => DatastoreErrorKind::Operational,
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => DatastoreErrorKind::Programming,
            _ => DatastoreErrorKind::Generic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DatastoreErrorKind::Programming => "ProgrammingError",
            DatastoreErrorKind::Operational => "OperationalError",
            DatastoreErrorKind::Integrity => "IntegrityError",
            DatastoreErrorKind::Generic => "DatabaseError",
        }
    }

    pub fn response_code(self) -> ResponseCode {
        match self {
            DatastoreErrorKind::Programming => ResponseCode::ProgrammingError,
            DatastoreErrorKind::Operational => ResponseCode::OperationalError,
            DatastoreErrorKind::Integrity => ResponseCode::IntegrityError,
            DatastoreErrorKind::Generic => ResponseCode::DatabaseError,
        }
    }
}

/// Classify a Postgres SQLSTATE by its two-character class.
pub fn classify_sqlstate(code: &str) -> DatastoreErrorKind {
    match code.get(..2) {
        Some("23") => DatastoreErrorKind::Integrity,
        Some("42" | "0A" | "26" | "34") => DatastoreErrorKind::Programming,
        Some("08" | "40" | "53" | "54" | "55" | "57" | "58") => DatastoreErrorKind::Operational,
        _ => DatastoreErrorKind::Generic,
    }
}
