use crate::errors::{PersistenceError, PersistenceResult};
use crate::store::{PersistenceStore, PlayerId, PlayerRecord};
use schema::{CaughtRecord, ChosenSnapshot};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// One postcard file per player under a directory.
///
/// Every write replaces the whole file via a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, player: &PlayerId) -> PathBuf {
        let file_stem: String = player
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.postcard", file_stem))
    }

    fn read_record(&self, player: &PlayerId) -> PersistenceResult<PlayerRecord> {
        match fs::read(self.path_for(player)) {
            Ok(bytes) => Ok(postcard::from_bytes(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PlayerRecord::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_record(&self, player: &PlayerId, record: &PlayerRecord) -> PersistenceResult<()> {
        let path = self.path_for(player);
        let tmp = path.with_extension("postcard.tmp");
        let bytes = postcard::to_allocvec(record)?;
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        debug!(player = %player, bytes = bytes.len(), "player record written");
        Ok(())
    }

    fn update<F>(&self, player: &PlayerId, change: F) -> PersistenceResult<()>
    where
        F: FnOnce(&mut PlayerRecord),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut record = self.read_record(player)?;
        change(&mut record);
        self.write_record(player, &record)
    }
}

impl PersistenceStore for FileStore {
    fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> PersistenceResult<()> {
        self.update(player, |record| record.chosen = Some(snapshot.clone()))
    }

    fn load_chosen(&self, player: &PlayerId) -> PersistenceResult<ChosenSnapshot> {
        self.read_record(player)?
            .chosen
            .ok_or_else(|| PersistenceError::NotFound(player.clone()))
    }

    fn append_caught(&self, player: &PlayerId, record: &CaughtRecord) -> PersistenceResult<()> {
        self.update(player, |stored| stored.caught.push(record.clone()))
    }

    fn list_caught(&self, player: &PlayerId) -> PersistenceResult<Vec<CaughtRecord>> {
        Ok(self.read_record(player)?.caught)
    }

    fn clear_caught(&self, player: &PlayerId) -> PersistenceResult<()> {
        self.update(player, |record| record.caught.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{caught, chosen};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!(
            "pokemon-encounter-{}-{}-{}",
            name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_records_survive_reopening() {
        let dir = scratch_dir("reopen");
        let player = PlayerId::from("lucas");
        {
            let store = FileStore::open(&dir).unwrap();
            store.save_chosen(&player, &chosen("chimchar")).unwrap();
            store.append_caught(&player, &caught("geodude")).unwrap();
        }

        let store = FileStore::open(&dir).unwrap();
        assert_eq!(store.load_chosen(&player).unwrap(), chosen("chimchar"));
        assert_eq!(store.list_caught(&player).unwrap(), vec![caught("geodude")]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_not_found_is_distinct_from_corruption() {
        let dir = scratch_dir("corrupt");
        let store = FileStore::open(&dir).unwrap();
        let player = PlayerId::from("barry");

        assert!(store.load_chosen(&player).unwrap_err().is_not_found());
        assert_eq!(store.count_caught(&player).unwrap(), 0);

        fs::write(store.path_for(&player), [0xff, 0xff, 0xff]).unwrap();
        let err = store.load_chosen(&player).unwrap_err();
        assert!(matches!(err, PersistenceError::Codec(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_clear_keeps_chosen() {
        let dir = scratch_dir("clear");
        let store = FileStore::open(&dir).unwrap();
        let player = PlayerId::from("dawn/../x");
        store.save_chosen(&player, &chosen("piplup")).unwrap();
        store.append_caught(&player, &caught("zubat")).unwrap();
        store.clear_caught(&player).unwrap();

        assert_eq!(store.count_caught(&player).unwrap(), 0);
        assert_eq!(store.load_chosen(&player).unwrap().name, "piplup");
        assert!(store.path_for(&player).starts_with(store.dir()));
        fs::remove_dir_all(&dir).unwrap();
    }
}
