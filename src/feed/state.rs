//! Tri-state value observed by the view

use std::sync::Arc;

use serde::Serialize;

use crate::photos::FetchError;

/// Lifecycle of one aggregate fetch
#[derive(Debug, Clone, Default)]
pub enum FetchState {
    /// Requests still in flight
    #[default]
    Loading,
    /// Any request failed; detail is kept but never rendered
    Failed(Arc<FetchError>),
    /// Image URLs in request order
    Ready(Vec<String>),
}

impl FetchState {
    /// True until the fetch settles
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn urls(&self) -> &[String] {
        match self {
            FetchState::Ready(urls) => urls,
            _ => &[],
        }
    }

    /// Short status label
    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Loading => "loading",
            FetchState::Failed(_) => "failed",
            FetchState::Ready(_) => "ready",
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            status: self.label(),
            loading: self.is_loading(),
            urls: self.urls().to_vec(),
        }
    }
}

impl From<Result<Vec<String>, FetchError>> for FetchState {
    fn from(result: Result<Vec<String>, FetchError>) -> Self {
        match result {
            Ok(urls) => FetchState::Ready(urls),
            Err(err) => FetchState::Failed(Arc::new(err)),
        }
    }
}

/// JSON-friendly view of [`FetchState`] (error detail withheld)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub status: &'static str,
    pub loading: bool,
    pub urls: Vec<String>,
}
