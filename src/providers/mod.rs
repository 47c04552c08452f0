// Providers layer - Work performers
//
// Providers hold the reusable operations coordinators orchestrate: token
// handling, access control and the outbound collaborators (blob storage,
// mail, background media cleanup).

pub mod access_control_provider;
pub mod blob_store;
pub mod cleanup_queue;
pub mod crypto_provider;
pub mod notifier;
pub mod token_provider;

pub use access_control_provider::AccessControlProvider;
pub use blob_store::{BlobStore, LocalBlobStore, MemoryBlobStore, StoredBlob};
pub use cleanup_queue::CleanupQueue;
pub use crypto_provider::CryptoProvider;
pub use notifier::{ConsoleNotifier, EmailMessage, MemoryNotifier, Notifier, SmtpNotifier, notifier_from_settings};
pub use token_provider::{ResetToken, TokenProvider};
