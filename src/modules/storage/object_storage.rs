use async_trait::async_trait;

use crate::core::error::AppError;

/// Object storage operations the services depend on.
///
/// Keys are full object paths inside the bucket (including the public
/// prefix). URLs are what gets persisted on documents.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Build a public object key from a path relative to the public prefix
    fn public_key(&self, path: &str) -> String;

    /// Upload bytes under `key`, returning the key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// URL under which a stored object is served
    fn url_for(&self, key: &str) -> String;

    /// Reverse of `url_for`; `None` for URLs that point elsewhere
    fn key_from_url(&self, url: &str) -> Option<String>;
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE_URL: &str = "http://storage.test/bucket";

    /// In-process storage double recording every object
    #[derive(Default)]
    pub struct InMemoryStorage {
        objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
        fail_uploads: bool,
    }

    impl InMemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_uploads: true,
                ..Self::default()
            }
        }

        pub fn contains(&self, key: &str) -> bool {
            self.objects.lock().unwrap().contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.objects.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn insert(&self, key: &str, data: &[u8]) {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data.to_vec(), "image/jpeg".to_string()));
        }
    }

    #[async_trait]
    impl ObjectStorage for InMemoryStorage {
        fn public_key(&self, path: &str) -> String {
            format!("public/{}", path)
        }

        async fn upload(
            &self,
            key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> Result<String, AppError> {
            if self.fail_uploads {
                return Err(AppError::ExternalServiceError(format!(
                    "upload of '{}' refused",
                    key
                )));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(key.to_string())
        }

        async fn delete(&self, key: &str) -> Result<(), AppError> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        fn url_for(&self, key: &str) -> String {
            format!("{}/{}", BASE_URL, key)
        }

        fn key_from_url(&self, url: &str) -> Option<String> {
            url.strip_prefix(&format!("{}/", BASE_URL))
                .map(|k| k.to_string())
        }
    }
}
