use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("Uploading to '{folder}' failed: {message}")]
    Upload { folder: String, message: String },

    #[error("Destroying blob '{public_id}' failed: {message}")]
    Destroy { public_id: String, message: String },

    #[error("Blob store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
