#[macro_use]
mod logger;
mod config;
mod db;
mod files;
mod migration;
mod server;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use deskio_core::{Desk, RecordStore};

use config::{Config, StoreConfig};

trait ResultLog {
    type OkType;
    fn expect_log(self, msg: &str) -> Self::OkType;
}
impl<T, S: AsRef<str>> ResultLog for Result<T, S> {
    type OkType=T;
    fn expect_log(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) if msg.is_empty() => {
                log_error!("{}", e.as_ref());
                panic!("{}", e.as_ref())
            }
            Err(e) => {
                log_error!("{}: {}", msg, e.as_ref());
                panic!("{}: {}", msg, e.as_ref())
            }
        }
    }
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, String> {
    let store: Arc<dyn RecordStore> = match config {
        StoreConfig::Database { url } => {
            log_info!("Opening database {}", url);
            Arc::new(db::DatabaseStore::connect(url).await.map_err(|e| e.to_string())?)
        }
        StoreConfig::Files { directory } => {
            log_info!("Opening file store in {}", directory.display());
            Arc::new(files::FileStore::new(directory))
        }
    };
    store.init().await.map_err(|e| e.to_string())?;
    Ok(store)
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path).expect_log("Could not load the configuration file");
    logger::init(config.log_level()).map_err(|e| e.to_string()).expect_log("Could not install the logger");
    if config.filepath().is_none() {
        log_warn!("{} not found, using the default configuration", config_path);
    }

    let store = open_store(&config.store).await.expect_log("Could not open the store");
    migration::do_migration(store.as_ref(), &config.migration)
        .await
        .map_err(|e| e.to_string())
        .expect_log("Migration failed");

    let state = Arc::new(server::AppState::new(Desk::new(store), &config));
    server::serve(config.port, state)
        .await
        .map_err(|e| e.to_string())
        .expect_log("Server stopped");
}
