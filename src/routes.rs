use crate::{
    api::{attendance, notification},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::report)))
                    // /attendance/me
                    .service(web::resource("/me").route(web::get().to(attendance::my_attendance)))
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    // /attendance/scan
                    .service(web::resource("/scan").route(web::post().to(attendance::scan)))
                    // /attendance/record
                    .service(
                        web::resource("/record").route(web::post().to(attendance::upsert_record)),
                    )
                    // /attendance/validate
                    .service(
                        web::resource("/validate").route(web::post().to(attendance::validate)),
                    )
                    // /attendance/transmit
                    .service(
                        web::resource("/transmit").route(web::post().to(attendance::transmit)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    // /notifications
                    .service(
                        web::resource("")
                            .route(web::get().to(notification::list_notifications)),
                    )
                    // /notifications/read-all
                    .service(
                        web::resource("/read-all")
                            .route(web::put().to(notification::mark_all_read)),
                    )
                    // /notifications/{id}/read
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    ),
            ),
    );
}
