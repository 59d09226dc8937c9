use actix_cors::Cors;
use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health checks
        .route("/", web::get().to(handlers::root))
        .route("/health", web::get().to(handlers::health_check))
        .route("/metrics", web::get().to(handlers::metrics_endpoint))

        // API
        .service(
            web::scope("/api")
                .wrap(Cors::permissive())
                .route("/process-documents", web::post().to(handlers::process_documents))
                .route("/download/{request_id}", web::get().to(handlers::download_document))
        );
}
