use std::{io::ErrorKind, path::PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Slot holding the tally history document.
pub const TALLY_SLOT: &str = "tap-history";
/// Slot holding the settings document.
pub const SETTINGS_SLOT: &str = "tap-settings";

/// Interface for abstracting the named-slot store application state is kept
/// in. Slots are independent; there is no cross-slot transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Sync + Send + 'static {
    /// Reads a slot. A slot that was never written reads as [None].
    async fn read(&self, slot: &str) -> Result<Option<String>>;

    /// Overwrites a slot with the given document.
    async fn write(&self, slot: &str, contents: &str) -> Result<()>;

    /// Removes a slot. Removing an absent slot is not an error.
    async fn remove(&self, slot: &str) -> Result<()>;
}

/// The main realization of [BlobStore]: one file per slot inside the
/// application directory.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn read(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        debug!("Reading slot {path:?}");
        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        let read_result = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        read_result?;
        Ok(Some(contents))
    }

    async fn write(&self, slot: &str, contents: &str) -> Result<()> {
        let path = self.slot_path(slot);
        debug!("Writing slot {path:?}");
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;
        file.lock_exclusive()?;
        let result = write_contents(&mut file, contents).await;
        file.unlock_async().await?;
        result
    }

    async fn remove(&self, slot: &str) -> Result<()> {
        match tokio::fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_contents(file: &mut File, contents: &str) -> Result<()> {
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
