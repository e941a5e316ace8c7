use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use deskio_core::{StoreError, StoreResult};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, MutexGuard};

/// Fichier JSON contenant un tableau d'enregistrements.
///
/// Le fichier est relu à chaque accès. Les écritures passent par un [DataGuard] qui
/// garde le verrou du fichier entre la lecture et [DataGuard::commit].
#[derive(Debug)]
pub struct Data<T> {
    lock: Mutex<()>,
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> Data<T> {
    fn filename(directory: &Path, stem: &str) -> PathBuf {
        directory.join(format!("{}.json", stem))
    }
    pub fn new(directory: &Path, stem: &str) -> Self {
        Self {
            lock: Mutex::new(()),
            path: Self::filename(directory, stem),
            _records: PhantomData,
        }
    }
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

impl<T: DeserializeOwned> Data<T> {
    /// Contenu du fichier, `None` s'il n'existe pas.
    async fn load(&self) -> StoreResult<Option<Vec<T>>> {
        let file_content = match tokio::fs::read(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if file_content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(serde_json::from_slice(&file_content)?))
    }
    pub async fn read(&self) -> StoreResult<Option<Vec<T>>> {
        let _lock = self.lock.lock().await;
        self.load().await
    }
    /// Verrouille le fichier et charge son contenu (vide s'il n'existe pas).
    pub async fn write(&self) -> StoreResult<DataGuard<'_, T>> {
        let lock = self.lock.lock().await;
        let records = self.load().await?.unwrap_or_default();
        Ok(DataGuard {
            _lock: lock,
            records,
            path: &self.path,
        })
    }
}

pub struct DataGuard<'a, T> {
    _lock: MutexGuard<'a, ()>,
    records: Vec<T>,
    path: &'a Path,
}

impl<'a, T> Deref for DataGuard<'a, T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
impl<'a, T> DerefMut for DataGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.records
    }
}

impl<'a, T: Serialize> DataGuard<'a, T> {
    /// Écrit le contenu dans un fichier temporaire puis le renomme par dessus l'original.
    /// Sans appel à `commit`, les modifications sont perdues.
    pub async fn commit(self) -> StoreResult<()> {
        let value = serde_json::to_vec_pretty(&self.records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value).await.map_err(|e| StoreError::io(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, self.path).await.map_err(|e| StoreError::io(self.path, e))?;
        Ok(())
    }
}
