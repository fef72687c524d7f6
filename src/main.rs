use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use prize_wheel_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::CasinoIntegrationAdapter,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    repositories::{SeaOrmMiniGameRepository, SeaOrmWheelRepository},
    services::{GrantPolicy, MiniGameService, SectorSelectionEngine, WheelService},
    swagger::swagger_config,
    tasks,
    utils::{JwtService, OsRandomSource},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt.secret);

    if config.casinos.is_empty() {
        log::warn!("No casinos configured; every casino call will fail with NOT_FOUND");
    }
    let casino = Arc::new(
        CasinoIntegrationAdapter::new(&config.integration, &config.casinos)
            .context("Failed to build casino HTTP client")?,
    );
    let wheel_repo = Arc::new(SeaOrmWheelRepository::new(pool.clone()));
    let mini_game_repo = Arc::new(SeaOrmMiniGameRepository::new(pool.clone()));
    let engine = SectorSelectionEngine::new(Arc::new(OsRandomSource));

    let wheel_service = WheelService::new(wheel_repo.clone(), casino.clone());
    let mini_game_service = MiniGameService::new(
        wheel_repo,
        mini_game_repo,
        casino,
        engine,
        GrantPolicy::from(&config.sweeper),
    );

    tasks::spawn_all(mini_game_service.clone(), &config.sweeper);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .app_data(web::Data::new(wheel_service.clone()))
            .app_data(web::Data::new(mini_game_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::wheel_config)
                    .configure(handlers::mini_game_config)
                    .configure(handlers::game_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
