//! Shared test infrastructure for the accounts crates.
//!
//! - [`TestDatabase`]: PostgreSQL container with migrations applied
//! - [`TestUploadDir`]: throwaway directory for stored profile images
//! - [`TestDataBuilder`]: deterministic users per test
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_postgres_test");
//!     let email = builder.email(1);
//! }
//! ```

use std::path::{Path, PathBuf};
use uuid::Uuid;

mod postgres;

pub use postgres::TestDatabase;

/// Deterministic user data derived from a seed, so parallel tests never collide.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from a hash of the test name.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// `u<seed>n<index>`, between 4 and 32 characters.
    pub fn username(&self, index: usize) -> String {
        let mut name = format!("u{:x}n{}", self.seed, index);
        name.truncate(32);
        name
    }

    pub fn email(&self, index: usize) -> String {
        format!("user{}-{:x}@mail.com", index, self.seed)
    }
}

/// A unique directory under the system temp dir, removed on drop.
pub struct TestUploadDir {
    path: PathBuf,
}

impl TestUploadDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("accounts-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("Failed to create upload directory");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of regular files directly under `subdir`.
    pub fn file_count(&self, subdir: &str) -> usize {
        std::fs::read_dir(self.path.join(subdir))
            .map(|entries| entries.filter_map(Result::ok).filter(|e| e.path().is_file()).count())
            .unwrap_or(0)
    }
}

impl Default for TestUploadDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestUploadDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
