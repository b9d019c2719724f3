//! HTTP server for the monban auth core.
//!
//! Wires the Postgres-backed stores into an [`mb_auth::AuthService`], runs the
//! whitelist reaper beside the actix-web server, and tears both down in order.
mod args;

pub use args::Args;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use mb_auth::AuthService;
use mb_auth::PgLegacy;
use mb_auth::PgWhitelist;
use mb_auth::User;
use mb_auth::Whitelist;
use std::sync::Arc;

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.config()?;
    let (users, connection) = mb_pg::connect(&args.db_url).await?;
    mb_pg::migrate::<User>(&users).await?;
    let legacy = PgLegacy::open(&args.legacy_db_url).await?;
    let whitelist = Arc::new(PgWhitelist::open(&args.db_url).await?);
    let (stop, stopped) = tokio::sync::watch::channel(());
    let reaper = {
        let whitelist = whitelist.clone();
        let lifetime = config.refresh();
        tokio::spawn(async move {
            whitelist
                .reap(lifetime, stopped)
                .await
                .inspect_err(|e| log::error!("whitelist reaper failed: {}", e))
        })
    };
    let auth = web::Data::new(AuthService::new(
        config,
        Arc::new(users),
        Arc::new(legacy),
        whitelist.clone(),
    ));
    log::info!("starting monban on {}", args.http);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(auth.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api/v0/auth")
                    .route("/login", web::post().to(mb_auth::login))
                    .route("/refresh", web::post().to(mb_auth::refresh)),
            )
    })
    .bind(&args.http)?
    .run()
    .await?;
    log::info!("server stopped, shutting down reaper");
    let _ = stop.send(());
    let _ = reaper.await?;
    whitelist.close().await?;
    connection.abort();
    Ok(())
}
