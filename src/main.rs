use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use hemavision::config::ServerArgs;
use hemavision::handlers::{self, AppState};
use hemavision::{telemetry, MockClassifier};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = ServerArgs::parse();
    if let Err(e) = telemetry::init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    let config = args
        .classifier_config()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let classifier =
        MockClassifier::new(config).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let state = web::Data::new(AppState {
        classifier,
        max_upload_bytes: args.max_upload_bytes,
    });

    tracing::info!(
        bind = %args.bind,
        strategy = ?state.classifier.config().strategy,
        "server running"
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&args.bind)?
    .run()
    .await
}
