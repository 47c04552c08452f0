// Request and response bodies for the HTTP layer
pub mod auth;
pub mod category;
pub mod comment;
pub mod common;
pub mod place;
pub mod review;
pub mod user;
