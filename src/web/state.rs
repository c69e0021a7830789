//! Shared handler state

use super::session::SessionStore;
use crate::adapters::database::ClinicStore;
use crate::adapters::media::MediaStore;
use crate::adapters::notify::Notifier;
use crate::config::{NotificationConfig, ServerConfig};
use crate::core::{Accounts, BookingService, Directory, Intake};
use std::sync::Arc;

/// Services and settings every handler can reach
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore + Send + Sync>,
    pub booking: Arc<BookingService>,
    pub directory: Directory,
    pub intake: Intake,
    pub accounts: Accounts,
    pub sessions: SessionStore,
    pub media: MediaStore,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ClinicStore + Send + Sync>,
        notifier: Arc<dyn Notifier>,
        server: &ServerConfig,
        notification: &NotificationConfig,
    ) -> Self {
        let media = MediaStore::new(&server.media_root, server.max_upload_bytes());
        Self {
            booking: Arc::new(BookingService::new(
                store.clone(),
                notifier,
                notification.from_address.clone(),
            )),
            directory: Directory::new(store.clone()),
            intake: Intake::new(store.clone(), media.clone()),
            accounts: Accounts::new(store.clone()),
            sessions: SessionStore::new(server.session_ttl_minutes),
            media,
            secure_cookies: server.secure_cookies,
            store,
        }
    }
}
