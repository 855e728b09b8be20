//! HTTP handlers and route configuration.

mod health;
mod limits;
mod products;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            // Submission limits
            .service(
                web::scope("/limits")
                    .route("/{name}", web::get().to(limits::status))
                    .route("/{name}/submissions", web::post().to(limits::record)),
            )
            // Product lookup
            .route("/products/search", web::get().to(products::search)),
    );
}
