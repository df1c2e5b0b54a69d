use uuid::Uuid;

use super::storage::ClientStorage;
use crate::config::VISITOR_ID_KEY;

pub struct VisitorIdentityStore<'a, S: ClientStorage + ?Sized> {
    storage: &'a S,
}

impl<'a, S: ClientStorage + ?Sized> VisitorIdentityStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn visitor_id(&self) -> String {
        match self.storage.get(VISITOR_ID_KEY) {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => log::warn!("Could not read visitor id: {}", e),
        }

        let id = Uuid::new_v4().to_string();
        if let Err(e) = self.storage.set(VISITOR_ID_KEY, &id) {
            log::warn!("Could not persist visitor id: {}", e);
        }
        id
    }

    #[cfg(test)]
    pub fn forget(&self) {
        if let Err(e) = self.storage.remove(VISITOR_ID_KEY) {
            log::warn!("Could not clear visitor id: {}", e);
        }
    }
}
