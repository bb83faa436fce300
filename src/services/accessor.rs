//! Lazily-initialized accessor for the generative model handle.
//!
//! The handle is built on first use, not at startup, so a missing credential
//! surfaces when a request actually needs the model. Initialization runs at
//! most once even under concurrent first calls, and a failed attempt is not
//! memoized.

use super::providers::GenerativeModel;
use crate::error::AppError;
use std::sync::Arc;
use tokio::sync::OnceCell;

type ModelFactory = dyn Fn() -> Result<Arc<dyn GenerativeModel>, AppError> + Send + Sync;

/// Owns the single process-lifetime model handle.
pub struct ModelAccessor {
    cell: OnceCell<Arc<dyn GenerativeModel>>,
    factory: Option<Box<ModelFactory>>,
}

impl ModelAccessor {
    /// Create an accessor that builds the handle from `factory` on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn GenerativeModel>, AppError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Some(Box::new(factory)),
        }
    }

    /// Create an accessor around an already-built provider.
    pub fn with_provider(provider: Arc<dyn GenerativeModel>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(provider)),
            factory: None,
        }
    }

    /// Return the cached handle, building it on the first call.
    pub async fn get(&self) -> Result<Arc<dyn GenerativeModel>, AppError> {
        self.cell
            .get_or_try_init(|| async {
                match &self.factory {
                    Some(factory) => factory(),
                    None => Err(AppError::Configuration(anyhow::anyhow!(
                        "Model accessor has no factory"
                    ))),
                }
            })
            .await
            .cloned()
    }
}
