use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{info, warn};
use std::sync::Arc;

use vehicle_auctions::config::Config;
use vehicle_auctions::domain::{Role, User};
use vehicle_auctions::marketplace::Marketplace;
use vehicle_auctions::payment::{PaymentOrchestrator, SandboxProvider};
use vehicle_auctions::persistence::{json_file, Database};
use vehicle_auctions::scheduler::AuctionCloser;
use vehicle_auctions::web::app::configure_app;
use vehicle_auctions::web::auth;

fn load_database(config: &Config) -> Database {
    if let Some(path) = &config.data_file {
        if path.exists() {
            match json_file::load_snapshot(path) {
                Ok(snapshot) => return Database::from_snapshot(snapshot),
                Err(e) => warn!("could not load snapshot, starting empty: {}", e),
            }
        }
    }
    Database::new()
}

fn seed_admin(db: &Database, config: &Config) {
    let Some((user_id, password)) = &config.admin_user else {
        return;
    };
    if db.get_user(user_id).is_ok() {
        return;
    }
    match auth::hash_password(password) {
        Ok(password_hash) => {
            let admin = User {
                user_id: user_id.clone(),
                name: "Administrator".to_string(),
                role: Role::Admin,
                password_hash,
                payment_verified: false,
                customer_ref: None,
                payment_method_ref: None,
                reset_token: None,
            };
            if db.insert_user(admin).is_ok() {
                info!("seeded admin account {}", user_id);
            }
        }
        Err(e) => warn!("could not seed admin account: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let db = Arc::new(load_database(&config));
    seed_admin(&db, &config);

    let provider = Arc::new(SandboxProvider::new());
    let payments = PaymentOrchestrator::new(provider, Arc::clone(&db), config.hold_ceiling);
    let marketplace = Arc::new(Marketplace::new(Arc::clone(&db), payments));

    AuctionCloser::new(
        Arc::clone(&marketplace),
        config.close_interval_secs,
        config.data_file.clone(),
    )
    .start();

    info!("Starting server on {}:{}", config.host, config.port);

    let app_data = web::Data::from(Arc::clone(&marketplace));
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
