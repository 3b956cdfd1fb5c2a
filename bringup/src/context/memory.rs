use std::sync::Mutex;

use super::{rank, ContextHit, ContextStore, Metadata, StoreError};

#[derive(Debug, Clone)]
struct Document {
    id: String,
    text: String,
    metadata: Metadata,
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Document>>, StoreError> {
        self.docs.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }
}

impl ContextStore for MemoryStore {
    fn upsert(&self, id: &str, text: &str, metadata: &Metadata) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.text = text.to_string();
                doc.metadata = metadata.clone();
            }
            None => docs.push(Document {
                id: id.to_string(),
                text: text.to_string(),
                metadata: metadata.clone(),
            }),
        }
        Ok(())
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<ContextHit>, StoreError> {
        let docs = self.lock()?;
        Ok(rank(
            text,
            k,
            docs.iter()
                .map(|d| (d.id.as_str(), d.text.as_str(), &d.metadata)),
        ))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }
}
