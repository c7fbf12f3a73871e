use std::path::PathBuf;

use actix_files::Files;
use actix_web::web;

use crate::modules::image_upload::{handle::upload_images, repository::UploadSink};

pub const DEFAULT_UPLOAD_ROUTE: &str = "/upload";
pub const DEFAULT_STORAGE_ROUTE: &str = "/storage";

fn mount_point(path: &str, default: &str) -> String {
    let path = if path.trim().is_empty() { default } else { path.trim() };
    path.trim_end_matches('/').to_string()
}

/// POST `<base_path>` and `<base_path>/images` to the upload handler.
pub fn configure<S>(base_path: &str) -> impl FnOnce(&mut web::ServiceConfig)
where
    S: UploadSink + Send + Sync + 'static,
{
    let base = mount_point(base_path, DEFAULT_UPLOAD_ROUTE);
    move |cfg: &mut web::ServiceConfig| {
        cfg.route(&base, web::post().to(upload_images::<S>))
            .route(&format!("{}/images", base), web::post().to(upload_images::<S>));
    }
}

/// Serve the storage tree read-only under `route`.
pub fn serve_storage(
    storage_path: impl Into<PathBuf>,
    route: &str,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let route = mount_point(route, DEFAULT_STORAGE_ROUTE);
    let storage_path = storage_path.into();
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(Files::new(&route, storage_path));
    }
}
