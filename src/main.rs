use actix_web::{web, App, HttpServer};
use rental_chat_service::{
    config, db, error, logging, routes, state::AppState, websocket::ConnectionRegistry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    let registry = ConnectionRegistry::new();

    let state = AppState {
        db,
        registry,
        config: cfg.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting rental-chat-service");

    let cors_origin = cfg.cors_origin.clone();
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .service(routes::chat::get_history)
            .service(routes::chat::search_users)
            .service(routes::chat::list_group_messages)
            .service(routes::chat::get_private_messages)
            .service(routes::chat::send_private_message)
            .service(routes::chats::list_chats)
            .service(routes::chats::create_chat)
            .service(routes::chats::get_chat_messages)
            .service(routes::chats::send_chat_message)
            .service(routes::wsroute::ws_handler)
            .route("/health", web::get().to(|| async { "OK" }))
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("run: {e}")))
}
