pub mod error;
pub mod paging;
pub mod reconcile;
pub mod repo;
pub mod service;
