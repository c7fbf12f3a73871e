use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::modules::image_upload::{route, FsSink, ImageUploadService};

mod api;
mod configs;
mod constants;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

fn cors() -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600);

    if ENV.frontend_url == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(&ENV.frontend_url)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let upload_config = configs::load_upload_config(&ENV)?;
    std::fs::create_dir_all(&upload_config.storage_path)?;

    let upload_service =
        web::Data::new(ImageUploadService::new(Arc::new(FsSink::new()), upload_config));
    let storage_path = upload_service.config().storage_path.clone();

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors())
            .app_data(upload_service.clone())
            .service(health_check)
            .configure(route::configure::<FsSink>(&ENV.upload_route))
            .configure(route::serve_storage(storage_path.clone(), &ENV.storage_route))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .run()
    .await
}
