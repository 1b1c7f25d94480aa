//! Contract for the remote form service
//!
//! The save flow only needs two calls: read a form's field descriptors and
//! submit an entry. [`WufooClient`](crate::http::WufooClient) implements them
//! against the real API; tests and embedders can supply their own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::response::EntryResponse;
use crate::types::{FormFieldDescriptor, OutgoingPayload};
use crate::Result;

/// Remote operations the save flow depends on
#[async_trait]
pub trait FormClient: Send + Sync {
    /// Field descriptors of `form`, in form order
    async fn find_fields(&self, form: &str) -> Result<Vec<FormFieldDescriptor>>;

    /// Submit `payload` as a new entry of `form`
    ///
    /// A rejected entry is `Ok(EntryResponse::Rejected(..))`; `Err` is kept
    /// for transport and protocol failures.
    async fn save_entry(&self, form: &str, payload: &OutgoingPayload) -> Result<EntryResponse>;
}

#[async_trait]
impl<T: FormClient + ?Sized> FormClient for Arc<T> {
    async fn find_fields(&self, form: &str) -> Result<Vec<FormFieldDescriptor>> {
        (**self).find_fields(form).await
    }

    async fn save_entry(&self, form: &str, payload: &OutgoingPayload) -> Result<EntryResponse> {
        (**self).save_entry(form, payload).await
    }
}
