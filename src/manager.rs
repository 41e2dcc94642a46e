use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use tokio::sync::RwLock;

use crate::batch::{session::Session, types::SessionConfig};

static SESSION_MANAGER: LazyLock<RwLock<HashMap<String, Arc<Session>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

pub(crate) fn get_session_manager() -> &'static RwLock<HashMap<String, Arc<Session>>> {
    &SESSION_MANAGER
}

pub(crate) async fn create_session(config: SessionConfig) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    let session = Arc::new(Session::begin(id.clone(), config));
    SESSION_MANAGER.write().await.insert(id.clone(), session);
    id
}

pub(crate) async fn get_session(id: &str) -> Option<Arc<Session>> {
    SESSION_MANAGER.read().await.get(id).cloned()
}

pub(crate) async fn remove_session(id: &str) -> anyhow::Result<()> {
    let mut sessions = SESSION_MANAGER.write().await;
    if let Some(session) = sessions.remove(id) {
        session.cancel();
    }
    Ok(())
}
