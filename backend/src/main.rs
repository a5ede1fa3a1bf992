mod model;
mod routes;
mod vision;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use routes::{AnalyzeMode, configure_routes};
use std::env;
use std::sync::Arc;
use vision::VisionProvider;
use vision::openai_service::{OpenAiVisionService, VisionConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = VisionConfig::from_env();
    if config.api_key.is_empty() {
        log::warn!(
            "OPENAI_API_KEY is not set. Classification requests will fail until it is provided."
        );
    }

    let service = OpenAiVisionService::new(config).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Vision provider setup failed: {}", e),
        )
    })?;
    let provider: Arc<dyn VisionProvider> = Arc::new(service);
    let provider = web::Data::from(provider);

    let mode = AnalyzeMode::from_env();
    log::info!("Analyze variant: {:?}", mode);

    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(provider.clone())
            .configure(|cfg| configure_routes(cfg, mode))
    })
    .bind(&bind_address)?
    .run()
    .await
}
