// Stores layer - Data access and repository pattern
pub mod category_store;
pub mod comment_store;
pub mod credential_store;
pub mod place_store;
pub mod review_store;

pub use category_store::CategoryStore;
pub use comment_store::CommentStore;
pub use credential_store::{CredentialStore, NewUser};
pub use place_store::{NewPlace, PlaceChanges, PlaceStore};
pub use review_store::{NewReview, ReviewStore};
