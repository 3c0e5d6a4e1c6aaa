use crate::datasource::{DataSourceError, IsolationLevel, Session};
use crate::error::{Result, ServiceFault};

use super::CommitMode;

/// One exclusive session bound across calls between open and close.
///
/// If the context is dropped without [`TransactionContext::close`], pending
/// work is rolled back and autocommit restored on a best-effort basis
/// before the session is released.
pub struct TransactionContext<S: Session> {
    session: Option<S>,
    commit_mode: CommitMode,
}

impl<S: Session> TransactionContext<S> {
    /// Disables autocommit and sets `isolation` on `session`.
    ///
    /// On failure the session is released before the error is returned.
    pub fn open(mut session: S, isolation: IsolationLevel, commit_mode: CommitMode) -> Result<Self> {
        session
            .set_autocommit(false)
            .map_err(|e| transaction_error("disabling autocommit", e))?;

        if let Err(e) = session.set_isolation(isolation) {
            if let Err(restore) = session.set_autocommit(true) {
                tracing::warn!("Failed to restore autocommit after open failure: {}", restore);
            }
            return Err(transaction_error("setting isolation level", e));
        }

        tracing::info!(
            "Transaction opened (isolation: {}, commit mode: {})",
            isolation,
            commit_mode
        );
        Ok(Self {
            session: Some(session),
            commit_mode,
        })
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    /// The bound session.
    pub fn session(&mut self) -> Result<&mut S> {
        self.session
            .as_mut()
            .ok_or_else(|| ServiceFault::TransactionLost {
                context: "accessing the transactional session".to_string(),
            })
    }

    /// Called after each successful write; commits in per-statement mode.
    pub fn after_write(&mut self) -> Result<()> {
        if self.commit_mode != CommitMode::PerStatement {
            return Ok(());
        }
        self.session()?
            .commit()
            .map_err(|e| transaction_error("committing", e))
    }

    /// Commits pending work in on-close mode, restores autocommit and
    /// releases the session. Release always happens; the first failure is
    /// returned afterwards.
    pub fn close(mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Err(ServiceFault::TransactionLost {
                context: "closing the transaction".to_string(),
            });
        };

        let mut failure = None;
        if self.commit_mode == CommitMode::OnClose {
            if let Err(e) = session.commit() {
                if let Err(rollback) = session.rollback() {
                    tracing::warn!("Rollback after failed commit failed: {}", rollback);
                }
                failure = Some(transaction_error("committing", e));
            }
        }

        if let Err(e) = session.set_autocommit(true) {
            tracing::warn!("Failed to restore autocommit: {}", e);
            if failure.is_none() {
                failure = Some(transaction_error("restoring autocommit", e));
            }
        }

        drop(session);
        tracing::info!("Transaction closed");

        match failure {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl<S: Session> Drop for TransactionContext<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            tracing::warn!("Transaction dropped without close; rolling back");
            if let Err(e) = session.rollback() {
                tracing::warn!("Rollback on drop failed: {}", e);
            }
            if let Err(e) = session.set_autocommit(true) {
                tracing::warn!("Failed to restore autocommit on drop: {}", e);
            }
        }
    }
}

fn transaction_error(operation: &'static str, source: DataSourceError) -> ServiceFault {
    ServiceFault::Transaction { operation, source }
}
