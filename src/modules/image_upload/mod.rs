pub mod extract;
pub mod handle;
pub mod model;
pub mod naming;
pub mod repository;
pub mod repository_fs;
pub mod route;
pub mod schema;
pub mod service;
pub mod validate;

pub use repository_fs::FsSink;
pub use service::ImageUploadService;
