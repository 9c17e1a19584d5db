// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Busy-flag guarded requests.
//!
//! Each logical operation owns a [`BusyFlag`]. Running a request through
//! [`guarded`] sets the flag for the duration of the request and clears it on
//! every exit path: success, error, early return, panic, or the future being
//! dropped. A second call while the flag is set fails with
//! [`ClientError::Busy`] instead of sending a duplicate request.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ClientError, Result};

/// Shared "request in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag if it is clear. The returned guard clears it on drop.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Run `request` while holding `flag`.
pub async fn guarded<T, F>(flag: &BusyFlag, operation: &'static str, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(_guard) = flag.try_acquire() else {
        tracing::debug!(operation, "Request already in flight, ignoring");
        return Err(ClientError::Busy);
    };

    let result = request.await;
    if let Err(e) = &result {
        tracing::warn!(operation, error = %e, "Request failed");
    }
    result
}

/// A value fetched from the API, with loading and failure kept distinct
/// from "loaded but absent" (which is `Loaded(None)` for optional data).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(v) => Some(v),
            _ => None,
        }
    }
}
