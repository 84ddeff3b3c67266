//! # Cart Store
//!
//! Keeps the cart snapshot of a payment, keyed by intent id, so a
//! process that starts fresh on the return redirect still confirms the
//! payment with the cart that was paid for.

use crate::cart::Cart;
use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Persistence for cart snapshots across the redirect
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn save(&self, intent_id: &str, cart: &Cart) -> PaymentResult<()>;

    async fn load(&self, intent_id: &str) -> PaymentResult<Option<Cart>>;

    /// Remove a snapshot; removing a missing one is not an error
    async fn remove(&self, intent_id: &str) -> PaymentResult<()>;
}

/// Type alias for a shared cart store
pub type BoxedCartStore = Arc<dyn CartStore>;

/// Process-local store. Loses everything when the process exits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn save(&self, intent_id: &str, cart: &Cart) -> PaymentResult<()> {
        self.carts
            .write()
            .await
            .insert(intent_id.to_string(), cart.clone());
        Ok(())
    }

    async fn load(&self, intent_id: &str) -> PaymentResult<Option<Cart>> {
        Ok(self.carts.read().await.get(intent_id).cloned())
    }

    async fn remove(&self, intent_id: &str) -> PaymentResult<()> {
        self.carts.write().await.remove(intent_id);
        Ok(())
    }
}

/// One JSON file per intent in a directory
#[derive(Debug, Clone)]
pub struct FileCartStore {
    dir: PathBuf,
}

impl FileCartStore {
    /// Use `dir`, creating it on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, intent_id: &str) -> PathBuf {
        let name: String = url::form_urlencoded::byte_serialize(intent_id.as_bytes()).collect();
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl CartStore for FileCartStore {
    async fn save(&self, intent_id: &str, cart: &Cart) -> PaymentResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PaymentError::CartStore(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.path_for(intent_id);
        let body = serde_json::to_vec_pretty(cart)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| PaymentError::CartStore(format!("{}: {}", path.display(), e)))?;

        debug!("Saved cart for intent {} to {}", intent_id, path.display());
        Ok(())
    }

    async fn load(&self, intent_id: &str) -> PaymentResult<Option<Cart>> {
        let path = self.path_for(intent_id);
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PaymentError::CartStore(format!("{}: {}", path.display(), e)))
            }
        };

        let cart = serde_json::from_slice(&body).map_err(|e| {
            PaymentError::CartStore(format!("corrupt cart file {}: {}", path.display(), e))
        })?;
        Ok(Some(cart))
    }

    async fn remove(&self, intent_id: &str) -> PaymentResult<()> {
        let path = self.path_for(intent_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PaymentError::CartStore(format!("{}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use rust_decimal_macros::dec;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(&Product::new("A", "Noodles", dec!(10))).unwrap();
        cart.add(&Product::new("A", "Noodles", dec!(10))).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let store = InMemoryCartStore::new();
        store.save("pi_1", &cart()).await.unwrap();

        assert_eq!(store.load("pi_1").await.unwrap(), Some(cart()));
        assert_eq!(store.load("pi_2").await.unwrap(), None);

        store.remove("pi_1").await.unwrap();
        store.remove("pi_1").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::new(dir.path().join("carts"));
        store.save("pi/../1", &cart()).await.unwrap();

        let reopened = FileCartStore::new(dir.path().join("carts"));
        assert_eq!(reopened.load("pi/../1").await.unwrap(), Some(cart()));
        assert_eq!(reopened.load("pi_other").await.unwrap(), None);

        reopened.remove("pi/../1").await.unwrap();
        assert_eq!(store.load("pi/../1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::new(dir.path());
        tokio::fs::write(dir.path().join("pi_1.json"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load("pi_1").await,
            Err(PaymentError::CartStore(_))
        ));
    }
}
