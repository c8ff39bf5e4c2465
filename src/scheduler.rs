// src/scheduler.rs
use chrono::Utc;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::marketplace::Marketplace;
use crate::persistence::json_file;

/// Background job standing in for the external scheduler: ticks on an
/// interval, resolves every auction past its end time, and writes a
/// snapshot when a data file is configured.
pub struct AuctionCloser {
    marketplace: Arc<Marketplace>,
    every: Duration,
    data_file: Option<PathBuf>,
}

impl AuctionCloser {
    pub fn new(
        marketplace: Arc<Marketplace>,
        every_secs: u64,
        data_file: Option<PathBuf>,
    ) -> Self {
        AuctionCloser {
            marketplace,
            every: Duration::from_secs(every_secs.max(1)),
            data_file,
        }
    }

    pub fn start(self) {
        tokio::spawn(async move {
            let mut ticker = interval(self.every);
            loop {
                ticker.tick().await;
                let closed = self.marketplace.close_due(Utc::now()).await;
                if closed > 0 {
                    info!("closed {} auction(s)", closed);
                }
                if let Some(path) = &self.data_file {
                    let snapshot = self.marketplace.db.snapshot();
                    if let Err(e) = json_file::save_snapshot(path, &snapshot) {
                        error!("snapshot save failed: {}", e);
                    }
                }
            }
        });
    }
}
