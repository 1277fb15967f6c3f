use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Known outcome codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    UserNotInDatabase,
    ClanNotInDatabase,
    DatabaseError,
    ProgrammingError,
    OperationalError,
    IntegrityError,
    ProgramError,
}

impl ResponseCode {
    pub fn code(self) -> u16 {
        match self {
            ResponseCode::Success => 1000,
            ResponseCode::UserNotInDatabase => 1008,
            ResponseCode::ClanNotInDatabase => 1009,
            ResponseCode::DatabaseError => 3000,
            ResponseCode::ProgrammingError => 3001,
            ResponseCode::OperationalError => 3002,
            ResponseCode::IntegrityError => 3003,
            ResponseCode::ProgramError => 5000,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ResponseCode::Success => "Success",
            ResponseCode::UserNotInDatabase => "UserNotExistinDatabase",
            ResponseCode::ClanNotInDatabase => "ClanNotExistinDatabase",
            ResponseCode::DatabaseError
            | ResponseCode::ProgrammingError
            | ResponseCode::OperationalError
            | ResponseCode::IntegrityError => "DatabaseError",
            ResponseCode::ProgramError => "ProgramError",
        }
    }

    /// Missing-parent codes are benign: the call succeeded at doing nothing.
    pub fn status(self) -> Status {
        match self {
            ResponseCode::Success
            | ResponseCode::UserNotInDatabase
            | ResponseCode::ClanNotInDatabase => Status::Ok,
            _ => Status::Error,
        }
    }
}

/// Structured result of every public operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    pub code: u16,
    pub message: String,
    pub data: Option<Value>,
}

impl Outcome {
    fn from_code(code: ResponseCode, data: Option<Value>) -> Self {
        Self {
            status: code.status(),
            code: code.code(),
            message: code.message().to_string(),
            data,
        }
    }

    pub fn success() -> Self {
        Self::from_code(ResponseCode::Success, None)
    }

    pub fn success_with(data: Value) -> Self {
        Self::from_code(ResponseCode::Success, Some(data))
    }

    pub fn user_not_found() -> Self {
        Self::from_code(ResponseCode::UserNotInDatabase, None)
    }

    pub fn clan_not_found() -> Self {
        Self::from_code(ResponseCode::ClanNotInDatabase, None)
    }

    /// Failure envelope; `data` carries the correlation id of the logged
    /// diagnostics.
    pub fn error(code: ResponseCode, error_id: Uuid) -> Self {
        Self::from_code(code, Some(json!({ "error_id": error_id.to_string() })))
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Correlation id of an error outcome.
    pub fn error_id(&self) -> Option<Uuid> {
        self.data
            .as_ref()?
            .get("error_id")?
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}
