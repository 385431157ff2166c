//! Uploadcare client
//!
//! Covers the two calls an ephemeral image relay needs from
//! [Uploadcare](https://uploadcare.com/):
//!
//! - `POST {upload_base}/base/` - direct multipart upload, returns the file id
//! - `DELETE {api_base}/files/{id}/` - remove a stored file (needs the secret key)
//!
//! ```no_run
//! use uploadcare_client::{UploadcareClient, UploadcareConfig};
//!
//! # async fn example() -> Result<(), uploadcare_client::UploadcareError> {
//! let client = UploadcareClient::new(UploadcareConfig::new("pub-key").with_secret_key("secret"));
//!
//! let file = client.upload(b"\x89PNG...".to_vec(), "image.png").await?;
//! println!("{}", file.cdn_url);
//!
//! client.delete(&file.file_id).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::UploadcareClient;
pub use error::{Result, UploadcareError};
pub use types::{UploadcareConfig, UploadedFile};
