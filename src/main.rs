use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskhive::auth::{AuthMiddleware, TokenSigner};
use taskhive::config::Config;
use taskhive::email;
use taskhive::routes;
use taskhive::routes::health;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // The signing secret is read once here and never again.
    let signer = web::Data::new(TokenSigner::new(&config.jwt_secret, config.token_ttl_hours));
    let mailer = web::Data::from(email::default_mailer());

    log::info!("Starting TaskHive server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(signer.clone())
            .app_data(mailer.clone())
            // Raw-body extractor cap; avatar uploads enforce their own 1 MiB
            // limit on top of this.
            .app_data(web::PayloadConfig::new(2 * 1024 * 1024))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
