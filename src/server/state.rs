use deskio_core::Desk;

use crate::config::Config;

pub struct AppState {
    pub desk: Desk,
    pub trend_window: usize,
}

impl AppState {
    pub fn new(desk: Desk, config: &Config) -> Self {
        Self {
            desk,
            trend_window: config.trend_window.max(1),
        }
    }
}
