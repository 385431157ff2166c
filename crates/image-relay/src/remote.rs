//! Uploadcare as a storage backend for the blob store

use crate::upload::sniff_format;
use async_trait::async_trait;
use axum::body::Bytes;
use expiring_blob_store::{Placement, StorageBackend, StoreError, Token};
use uploadcare_client::UploadcareClient;

/// Mirrors each blob to Uploadcare and deletes it again on expiry
pub struct UploadcareBackend {
    client: UploadcareClient,
}

impl UploadcareBackend {
    pub fn new(client: UploadcareClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageBackend for UploadcareBackend {
    fn name(&self) -> &'static str {
        "uploadcare"
    }

    async fn persist(
        &self,
        token: &Token,
        content: &Bytes,
    ) -> expiring_blob_store::Result<Option<Placement>> {
        let filename = format!("{}.{}", token, sniff_format(content).extension);
        let file = self
            .client
            .upload(content.to_vec(), &filename)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Some(Placement::new(file.file_id).with_public_url(file.cdn_url)))
    }

    async fn discard(&self, placement: &Placement) -> expiring_blob_store::Result<()> {
        self.client
            .delete(&placement.key)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}
