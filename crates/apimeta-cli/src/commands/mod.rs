pub mod cache;
pub mod ops;
pub mod request;
pub mod show;
