use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::apperrors::AppError;
use crate::context::RequestContext;

type PgTransaction = Transaction<'static, Postgres>;

/// Handle to the transaction of the current request.
#[derive(Clone, Default)]
pub struct Persistence {
    tx: Arc<Mutex<Option<PgTransaction>>>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(tx: PgTransaction) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Locks the transaction slot for the duration of one statement batch.
    ///
    /// Pass the guard to [`active`] to get the executor.
    pub async fn lock(&self) -> MutexGuard<'_, Option<PgTransaction>> {
        self.tx.lock().await
    }

    async fn take(&self) -> Option<PgTransaction> {
        self.tx.lock().await.take()
    }
}

/// The open transaction behind a locked slot; use `&mut **tx` as the executor.
pub fn active(slot: &mut Option<PgTransaction>) -> Result<&mut PgTransaction, AppError> {
    slot.as_mut()
        .ok_or_else(|| AppError::Internal("transaction is already closed".to_string()))
}

/// Starts database transactions.
#[async_trait::async_trait]
pub trait Transactioner: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn PersistenceTx>>;
}

/// An open transaction owned by a resolver call.
#[async_trait::async_trait]
pub trait PersistenceTx: Send + Sync {
    fn persistence(&self) -> Persistence;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback_unless_committed(&mut self);
}

#[derive(Debug, Clone)]
pub struct PgTransactioner {
    pool: PgPool,
}

impl PgTransactioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Transactioner for PgTransactioner {
    async fn begin(&self) -> Result<Box<dyn PersistenceTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("while opening transaction")?;
        Ok(Box::new(PgPersistenceTx {
            persistence: Persistence::new(tx),
            committed: false,
        }))
    }
}

struct PgPersistenceTx {
    persistence: Persistence,
    committed: bool,
}

#[async_trait::async_trait]
impl PersistenceTx for PgPersistenceTx {
    fn persistence(&self) -> Persistence {
        self.persistence.clone()
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .persistence
            .take()
            .await
            .ok_or_else(|| AppError::Internal("transaction is already closed".to_string()))?;
        tx.commit().await.context("while committing transaction")?;
        self.committed = true;
        Ok(())
    }

    async fn rollback_unless_committed(&mut self) {
        if self.committed {
            return;
        }
        if let Some(tx) = self.persistence.take().await {
            if let Err(err) = tx.rollback().await {
                log::warn!("transaction rollback failed: {}", err);
            }
        }
    }
}

/// Runs `op` inside a fresh transaction; commits on success, rolls back on error.
pub async fn with_transaction<T, F, Fut>(
    transact: &dyn Transactioner,
    ctx: &RequestContext,
    op: F,
) -> Result<T>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut tx = transact.begin().await?;
    let tx_ctx = ctx.with_persistence(tx.persistence());

    match op(tx_ctx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback_unless_committed().await;
            Err(err)
        }
    }
}
