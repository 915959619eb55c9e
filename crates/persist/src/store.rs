//! File-backed world persistence.
//!
//! Layout inside the store directory:
//! ```text
//! world.meta.json            - metadata and schema versions
//! snapshots/
//!   000001.snapshot.cbor.zst - CBOR+zstd compressed snapshots
//! events/
//!   000001.log.cbor.zst      - CBOR+zstd compressed event log segments
//! integrity/
//!   manifest.json            - hash chain manifest
//! ```

use crate::snapshot::Snapshot;
use axite_kernel::{World, WorldEvent};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Current schema versions.
const WORLD_SCHEMA_VERSION: u32 = 1;
const EVENT_SCHEMA_VERSION: u32 = 1;

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no snapshots found")]
    NoSnapshots,
}

/// Metadata stored in world.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMeta {
    pub world_schema_version: u32,
    pub event_schema_version: u32,
    pub snapshot_count: u32,
    pub event_segment_count: u32,
    /// Event segment count at the time of the latest snapshot; segments
    /// past this index replay on top of it.
    pub snapshot_at_segment: u32,
}

/// A single entry in the integrity manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Integrity manifest tracking all segment hashes in a chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

/// File-backed world store with schema versioning and integrity checking.
pub struct WorldFileStore {
    root: PathBuf,
    meta: WorldMeta,
    manifest: IntegrityManifest,
}

impl WorldFileStore {
    /// Open or create a world store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("snapshots"))?;
        std::fs::create_dir_all(root.join("events"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join("world.meta.json");
        let manifest_path = root.join("integrity").join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: WorldMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.world_schema_version != WORLD_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.world_schema_version,
                    expected_version: WORLD_SCHEMA_VERSION,
                });
            }
            if meta.event_schema_version != EVENT_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.event_schema_version,
                    expected_version: EVENT_SCHEMA_VERSION,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = WorldMeta {
                world_schema_version: WORLD_SCHEMA_VERSION,
                event_schema_version: EVENT_SCHEMA_VERSION,
                snapshot_count: 0,
                event_segment_count: 0,
                snapshot_at_segment: 0,
            };
            let manifest = IntegrityManifest::default();
            serde_json::to_writer_pretty(std::fs::File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(std::fs::File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Load the latest snapshot and replay later event segments on top.
    pub fn load_latest(&self) -> Result<World, StoreError> {
        if self.meta.snapshot_count == 0 {
            return Err(StoreError::NoSnapshots);
        }
        let snap = self.load_snapshot(self.meta.snapshot_count)?;
        if !snap.verify() {
            return Err(StoreError::IntegrityMismatch {
                expected: "valid snapshot hash".into(),
                actual: "snapshot hash mismatch".into(),
            });
        }

        let mut world = snap.restore();
        'segments: for seg_idx in (self.meta.snapshot_at_segment + 1)..=self.meta.event_segment_count
        {
            let events = self.load_event_segment(seg_idx)?;
            for event in &events {
                if matches!(event, WorldEvent::Regenerated { .. }) {
                    // The grid behind the barrier comes from the
                    // generator, not the log.
                    tracing::warn!(segment = seg_idx, "replay halted at regeneration barrier");
                    break 'segments;
                }
                world.apply(event);
            }
        }
        world.drain_events();
        Ok(world)
    }

    /// Append events to the store as a new segment.
    pub fn append_events(&mut self, events: &[WorldEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }
        self.meta.event_segment_count += 1;
        let seg_idx = self.meta.event_segment_count;
        let filename = format!("{seg_idx:06}.log.cbor.zst");
        let path = self.root.join("events").join(&filename);

        let cbor_bytes = cbor_serialize(events)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        let hash = sha256_hex(&compressed);
        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());

        std::fs::write(&path, &compressed)?;
        tracing::debug!(segment = seg_idx, events = events.len(), "event segment written");

        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: hash,
            prev_hash,
        });

        self.save_meta()?;
        self.save_manifest()?;
        Ok(())
    }

    /// Take a snapshot of the world and write it to disk.
    pub fn take_snapshot(&mut self, world: &World) -> Result<(), StoreError> {
        let snap = Snapshot::capture(world);
        self.meta.snapshot_count += 1;
        self.meta.snapshot_at_segment = self.meta.event_segment_count;
        let snap_idx = self.meta.snapshot_count;
        let filename = format!("{snap_idx:06}.snapshot.cbor.zst");
        let path = self.root.join("snapshots").join(&filename);

        let cbor_bytes = cbor_serialize(&snap)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        let hash = sha256_hex(&compressed);
        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());

        std::fs::write(&path, &compressed)?;
        tracing::info!(snapshot = snap_idx, tiles = snap.tiles.len(), "snapshot written");

        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: hash,
            prev_hash,
        });

        self.save_meta()?;
        self.save_manifest()?;
        Ok(())
    }

    /// Verify all integrity hashes in the manifest.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let mut prev_hash: Option<String> = None;
        for entry in &self.manifest.entries {
            // Chain continuity first.
            if entry.prev_hash != prev_hash {
                return Err(StoreError::IntegrityMismatch {
                    expected: prev_hash.unwrap_or_else(|| "None".into()),
                    actual: entry.prev_hash.clone().unwrap_or_else(|| "None".into()),
                });
            }

            let file_path = if entry.filename.contains("snapshot") {
                self.root.join("snapshots").join(&entry.filename)
            } else {
                self.root.join("events").join(&entry.filename)
            };

            let data = std::fs::read(&file_path)?;
            let actual_hash = sha256_hex(&data);
            if actual_hash != entry.sha256 {
                return Err(StoreError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual: actual_hash,
                });
            }

            prev_hash = Some(entry.sha256.clone());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &WorldMeta {
        &self.meta
    }

    fn load_snapshot(&self, index: u32) -> Result<Snapshot, StoreError> {
        let filename = format!("{index:06}.snapshot.cbor.zst");
        let path = self.root.join("snapshots").join(&filename);
        let compressed = std::fs::read(&path)?;
        self.verify_file_hash(&filename, &compressed)?;
        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    fn load_event_segment(&self, index: u32) -> Result<Vec<WorldEvent>, StoreError> {
        let filename = format!("{index:06}.log.cbor.zst");
        let path = self.root.join("events").join(&filename);
        let compressed = std::fs::read(&path)?;
        self.verify_file_hash(&filename, &compressed)?;
        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), StoreError> {
        let actual = sha256_hex(data);
        for entry in &self.manifest.entries {
            if entry.filename == filename {
                if entry.sha256 != actual {
                    return Err(StoreError::IntegrityMismatch {
                        expected: entry.sha256.clone(),
                        actual,
                    });
                }
                return Ok(());
            }
        }
        // File not in manifest is OK for first-time creation.
        Ok(())
    }

    fn save_meta(&self) -> Result<(), StoreError> {
        let path = self.root.join("world.meta.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.meta)?;
        Ok(())
    }

    fn save_manifest(&self) -> Result<(), StoreError> {
        let path = self.root.join("integrity").join("manifest.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.manifest)?;
        Ok(())
    }
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axite_common::{ActorId, GridCoord, Tile, TileType};
    use std::collections::BTreeMap;

    fn seeded_world() -> World {
        let mut tiles = BTreeMap::new();
        tiles.insert(GridCoord::ORIGIN, Tile::empty(GridCoord::ORIGIN));
        tiles.insert(
            GridCoord::new(2, 1),
            Tile::resource(GridCoord::new(2, 1), TileType::Crystal, 12),
        );
        let mut w = World::with_seed(42);
        w.install(tiles);
        w.drain_events();
        w
    }

    #[test]
    fn store_open_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();
        assert_eq!(store.meta().snapshot_count, 0);
        assert_eq!(store.meta().event_segment_count, 0);
        assert!(store.root().join("snapshots").is_dir());
        assert!(store.root().join("events").is_dir());
        assert!(store.root().join("integrity").is_dir());
    }

    #[test]
    fn store_snapshot_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();

        let mut world = seeded_world();
        store.take_snapshot(&world).unwrap();

        let miner = ActorId::new("0xa");
        world.mine(GridCoord::new(2, 1), &miner).unwrap();
        world.place_structure(GridCoord::ORIGIN, &miner);
        store.append_events(&world.drain_events()).unwrap();

        // Reopen and load.
        let store2 = WorldFileStore::open(tmp.path().join("world_data")).unwrap();
        let loaded = store2.load_latest().unwrap();
        assert_eq!(loaded.state_hash(), world.state_hash());
        assert_eq!(loaded.get(GridCoord::new(2, 1)).unwrap().durability, 11);
        assert_eq!(
            loaded.get(GridCoord::ORIGIN).unwrap().kind,
            TileType::Structure
        );
    }

    #[test]
    fn load_without_snapshots_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();
        assert!(matches!(store.load_latest(), Err(StoreError::NoSnapshots)));
    }

    #[test]
    fn store_integrity_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();
        store.take_snapshot(&seeded_world()).unwrap();
        store.verify_integrity().unwrap();
    }

    #[test]
    fn store_integrity_fail_closed_on_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world_data");
        let mut store = WorldFileStore::open(&path).unwrap();
        store.take_snapshot(&seeded_world()).unwrap();

        // Corrupt the snapshot file.
        let snap_path = path.join("snapshots").join("000001.snapshot.cbor.zst");
        let mut data = std::fs::read(&snap_path).unwrap();
        if let Some(byte) = data.last_mut() {
            *byte ^= 0xff;
        }
        std::fs::write(&snap_path, &data).unwrap();

        let store2 = WorldFileStore::open(&path).unwrap();
        assert!(store2.verify_integrity().is_err());
        assert!(store2.load_latest().is_err());
    }

    #[test]
    fn replay_halts_at_shift_barrier() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();

        let mut world = seeded_world();
        store.take_snapshot(&world).unwrap();
        let snapshot_hash = world.state_hash();

        // A genesis shift after the snapshot: its events must not replay.
        world.install(BTreeMap::new());
        store.append_events(&world.drain_events()).unwrap();

        let loaded = store.load_latest().unwrap();
        assert_eq!(loaded.state_hash(), snapshot_hash);
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world_data");
        let _store = WorldFileStore::open(&path).unwrap();

        // Tamper with the meta file to carry a wrong version.
        let meta_path = path.join("world.meta.json");
        let mut meta: WorldMeta =
            serde_json::from_reader(std::fs::File::open(&meta_path).unwrap()).unwrap();
        meta.world_schema_version = 999;
        serde_json::to_writer_pretty(std::fs::File::create(&meta_path).unwrap(), &meta).unwrap();

        match WorldFileStore::open(&path) {
            Err(StoreError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, WORLD_SCHEMA_VERSION);
            }
            Err(e) => panic!("expected SchemaMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn snapshot_after_events_resets_replay_base() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = WorldFileStore::open(tmp.path().join("world_data")).unwrap();

        let mut world = seeded_world();
        store.take_snapshot(&world).unwrap();
        let miner = ActorId::new("0xa");
        world.mine(GridCoord::new(2, 1), &miner).unwrap();
        store.append_events(&world.drain_events()).unwrap();

        // Second snapshot supersedes the first segment.
        store.take_snapshot(&world).unwrap();
        world.mine(GridCoord::new(2, 1), &miner).unwrap();
        store.append_events(&world.drain_events()).unwrap();

        let loaded = store.load_latest().unwrap();
        assert_eq!(loaded.state_hash(), world.state_hash());
        assert_eq!(loaded.get(GridCoord::new(2, 1)).unwrap().durability, 10);
    }
}
