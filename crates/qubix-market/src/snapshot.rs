//! JSON persistence of a marketplace and its host.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use qubix_core::Host;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MarketError, Result};
use crate::marketplace::Marketplace;

/// Snapshot format written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A marketplace frozen at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<H> {
    /// Format version.
    pub version: u32,
    /// Wall-clock time the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// The marketplace, including its host.
    pub market: Marketplace<H>,
}

impl<H> Snapshot<H> {
    /// Wraps `market` with the current time.
    pub fn new(market: Marketplace<H>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            market,
        }
    }

    /// Unwraps the marketplace.
    pub fn into_market(self) -> Marketplace<H> {
        self.market
    }
}

impl<H: Serialize> Snapshot<H> {
    /// Writes the snapshot as pretty JSON.
    ///
    /// The file is written next to `path` and renamed into place, so a
    /// reader never sees a partial snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), bytes = json.len(), "snapshot saved");
        Ok(())
    }
}

impl<H: Host + DeserializeOwned> Snapshot<H> {
    /// Reads a snapshot written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, was written
    /// in another format version, or fails [`Marketplace::verify`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path)?;
        let snapshot: Self = serde_json::from_slice(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MarketError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        snapshot.market.verify()?;
        debug!(path = %path.display(), saved_at = %snapshot.saved_at, "snapshot loaded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use qubix_core::{Address, Amount, JobId, MemoryHost, Tick};

    fn populated() -> Marketplace<MemoryHost> {
        let consumer = Address::from_public_key(&[1; 32]);
        let provider = Address::from_public_key(&[2; 32]);
        let mut host = MemoryHost::at_tick(Tick::new(5));
        host.mint(consumer, Amount::new(3000)).unwrap();
        host.mint(provider, Amount::new(2000)).unwrap();

        let mut market = Marketplace::new(host, MarketConfig::default()).unwrap();
        market.host_mut().set_caller(consumer);
        market
            .create_job(
                JobId::new("render-42").unwrap(),
                consumer,
                provider,
                Amount::new(1200),
                Tick::new(50),
            )
            .unwrap();
        market.host_mut().set_caller(provider);
        market
            .register_provider(provider, 64, Amount::new(3), Amount::new(1500))
            .unwrap();
        market
    }

    #[test]
    fn save_then_load_restores_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let market = populated();

        Snapshot::new(market.clone()).save(&path).unwrap();
        let restored = Snapshot::<MemoryHost>::load(&path).unwrap().into_market();

        assert_eq!(restored.escrow(), market.escrow());
        assert_eq!(restored.registry(), market.registry());
        assert_eq!(restored.config(), market.config());
        let custody = market.config().escrow_custody;
        assert_eq!(restored.host().balance(&custody), Amount::new(1200));
        assert_eq!(restored.host().current_tick(), Tick::new(5));
    }

    #[test]
    fn save_creates_parent_directories_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");

        Snapshot::new(populated()).save(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let mut snapshot = Snapshot::new(populated());
        snapshot.version = 99;
        snapshot.save(&path).unwrap();

        let err = Snapshot::<MemoryHost>::load(&path).unwrap_err();
        assert!(matches!(
            err,
            MarketError::SnapshotVersion { found: 99, expected: 1 }
        ));
    }

    fn edit_saved(path: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
        let mut value: serde_json::Value =
            serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        edit(&mut value);
        fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    #[test]
    fn edited_custody_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        Snapshot::new(populated()).save(&path).unwrap();

        let other = serde_json::to_value(Address::contract(7)).unwrap();
        edit_saved(&path, |v| v["market"]["config"]["escrow_custody"] = other);

        let err = Snapshot::<MemoryHost>::load(&path).unwrap_err();
        assert!(matches!(err, MarketError::Inconsistent(ref msg) if msg.contains("escrow custody")));
    }

    #[test]
    fn edited_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        Snapshot::new(populated()).save(&path).unwrap();

        edit_saved(&path, |v| v["market"]["config"]["max_jobs"] = serde_json::json!(0));

        let err = Snapshot::<MemoryHost>::load(&path).unwrap_err();
        assert!(matches!(err, MarketError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Snapshot::<MemoryHost>::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MarketError::Io(_)));
    }
}
