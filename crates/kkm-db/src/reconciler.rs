use std::fmt::Debug;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use kkm_codec::CodecError;
use kkm_errlog::{ErrorLogWriter, ErrorRecord};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{Outcome, ReconcileError};

/// Entity reconciler over an explicitly constructed pool.
///
/// Cheap to clone; clones share the pool and the error log.
#[derive(Clone)]
pub struct Reconciler {
    pool: PgPool,
    error_log: Option<Arc<Mutex<ErrorLogWriter>>>,
}

impl Reconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            error_log: None,
        }
    }

    /// Also append failure diagnostics to a JSON-Lines file at `path`.
    pub fn with_error_log(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let writer = ErrorLogWriter::new(path)?;
        self.error_log = Some(Arc::new(Mutex::new(writer)));
        Ok(self)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) async fn begin(&self) -> Result<Transaction<'static, Postgres>, ReconcileError> {
        Ok(self.pool.begin().await?)
    }

    /// Public boundary of every mutating operation.
    ///
    /// Codec failures are handed back to the caller as errors. Anything else
    /// becomes an error outcome carrying a fresh correlation id, and its
    /// diagnostics are logged under that id.
    pub(crate) fn finish<A: Debug>(
        &self,
        operation: &'static str,
        args: &A,
        result: Result<Outcome, ReconcileError>,
    ) -> Result<Outcome, CodecError> {
        let err = match result {
            Ok(outcome) => return Ok(outcome),
            Err(ReconcileError::Codec(e)) => {
                warn!(operation, args = ?args, error = %e, "codec failure, transaction rolled back");
                return Err(e);
            }
            Err(e) => e,
        };

        let error_id = Uuid::new_v4();
        let code = err.response_code();
        error!(
            %error_id,
            operation,
            error_name = err.error_name(),
            code = code.code(),
            args = ?args,
            "{}",
            err.details()
        );
        self.log_failure(error_id, operation, args, &err);

        Ok(Outcome::error(code, error_id))
    }

    fn log_failure<A: Debug>(
        &self,
        error_id: Uuid,
        operation: &'static str,
        args: &A,
        err: &ReconcileError,
    ) {
        let Some(log) = &self.error_log else {
            return;
        };
        let record = ErrorRecord::new(
            error_id,
            err.error_type(),
            err.error_name(),
            operation,
            format!("{args:?}"),
            err.details(),
        );
        let mut writer = match log.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.append(&record) {
            warn!(%error_id, error = %e, "error log append failed");
        }
    }
}

/// Commit on success, roll back otherwise.
pub(crate) async fn settle(
    tx: Transaction<'static, Postgres>,
    result: Result<Outcome, ReconcileError>,
) -> Result<Outcome, ReconcileError> {
    match result {
        Ok(outcome) => {
            tx.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

/// Evaluation time, whole seconds.
pub(crate) fn now_secs() -> i64 {
    Utc::now().timestamp()
}
