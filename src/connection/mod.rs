pub mod auth;
pub mod config;

use crate::core::{DbError, Result};
use auth::User;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Cancellation flag shared between an operation and whoever may kill it.
#[derive(Debug, Clone, Default)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-invocation execution context.
///
/// Carries the authenticated user and the cancellation state inherited from
/// the caller. Analysis phases poll [`OperationContext::check_for_interrupt`].
#[derive(Debug, Clone)]
pub struct OperationContext {
    id: u64,
    user: User,
    interrupter: Interrupter,
    deadline: Option<Instant>,
}

impl OperationContext {
    pub fn new(user: User, interrupter: Interrupter) -> Self {
        Self {
            id: NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed),
            user,
            interrupter,
            deadline: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.deadline = Some(Instant::now() + limit);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn interrupter(&self) -> &Interrupter {
        &self.interrupter
    }

    pub fn check_for_interrupt(&self) -> Result<()> {
        if self.interrupter.is_interrupted() {
            return Err(DbError::Interrupted);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DbError::MaxTimeMSExpired);
            }
        }
        Ok(())
    }
}
