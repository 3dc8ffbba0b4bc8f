use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;

use crate::api::CatalogApi;
use crate::domain::{Album, Collector, Musician, NewAlbum, NewCollector, Prize};
use crate::error::FetchError;
use crate::store::{tables, EntityStore};

/// Read path consumed by the list state machine.
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, FetchError>;
}

/// Read path consumed by the detail state machine and the resolution
/// engine.
#[async_trait]
pub trait GetSource<T>: Send + Sync {
    async fn get(&self, id: i64) -> Result<T, FetchError>;
}

/// Album read/write path.
///
/// `list` is remote-authoritative: the cache is refreshed best-effort in
/// the background on success, and a remote failure is surfaced even when a
/// cached snapshot exists. `get` never consults the cache. `create` and
/// `add_musician` do not merge locally; callers refresh afterwards.
#[derive(Clone)]
pub struct AlbumRepository {
    api: Arc<dyn CatalogApi>,
    store: Option<EntityStore<Album>>,
}

impl AlbumRepository {
    pub fn new(api: Arc<dyn CatalogApi>, store: Option<EntityStore<Album>>) -> Self {
        Self { api, store }
    }

    pub async fn list(&self) -> Result<Vec<Album>, FetchError> {
        let albums = self.api.list_albums().await?;
        if let Some(store) = &self.store {
            store.spawn_replace_all(&albums);
        }
        Ok(albums)
    }

    /// The local snapshot, for callers that explicitly want stale data.
    /// Empty when caching is disabled or the store is unreadable.
    pub async fn cached(&self) -> Vec<Album> {
        read_cached(self.store.as_ref()).await
    }

    pub async fn get(&self, id: i64) -> Result<Album, FetchError> {
        Ok(self.api.get_album(id).await?)
    }

    pub async fn create(&self, draft: &NewAlbum) -> Result<Album, FetchError> {
        Ok(self.api.create_album(draft).await?)
    }

    pub async fn add_musician(&self, album_id: i64, musician_id: i64) -> Result<(), FetchError> {
        Ok(self.api.add_musician_to_album(album_id, musician_id).await?)
    }
}

#[derive(Clone)]
pub struct MusicianRepository {
    api: Arc<dyn CatalogApi>,
    store: Option<EntityStore<Musician>>,
}

impl MusicianRepository {
    pub fn new(api: Arc<dyn CatalogApi>, store: Option<EntityStore<Musician>>) -> Self {
        Self { api, store }
    }

    pub async fn list(&self) -> Result<Vec<Musician>, FetchError> {
        let musicians = self.api.list_musicians().await?;
        if let Some(store) = &self.store {
            store.spawn_replace_all(&musicians);
        }
        Ok(musicians)
    }

    pub async fn cached(&self) -> Vec<Musician> {
        read_cached(self.store.as_ref()).await
    }

    pub async fn get(&self, id: i64) -> Result<Musician, FetchError> {
        Ok(self.api.get_musician(id).await?)
    }
}

#[derive(Clone)]
pub struct CollectorRepository {
    api: Arc<dyn CatalogApi>,
    store: Option<EntityStore<Collector>>,
}

impl CollectorRepository {
    pub fn new(api: Arc<dyn CatalogApi>, store: Option<EntityStore<Collector>>) -> Self {
        Self { api, store }
    }

    pub async fn list(&self) -> Result<Vec<Collector>, FetchError> {
        let collectors = self.api.list_collectors().await?;
        if let Some(store) = &self.store {
            store.spawn_replace_all(&collectors);
        }
        Ok(collectors)
    }

    pub async fn cached(&self) -> Vec<Collector> {
        read_cached(self.store.as_ref()).await
    }

    pub async fn get(&self, id: i64) -> Result<Collector, FetchError> {
        Ok(self.api.get_collector(id).await?)
    }

    pub async fn create(&self, draft: &NewCollector) -> Result<Collector, FetchError> {
        Ok(self.api.create_collector(draft).await?)
    }
}

/// Prizes have no list endpoint and no cache; detail fetches only.
#[derive(Clone)]
pub struct PrizeRepository {
    api: Arc<dyn CatalogApi>,
}

impl PrizeRepository {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: i64) -> Result<Prize, FetchError> {
        Ok(self.api.get_prize(id).await?)
    }
}

async fn read_cached<T>(store: Option<&EntityStore<T>>) -> Vec<T>
where
    T: crate::domain::Identified
        + serde::Serialize
        + serde::de::DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    match store {
        Some(store) => store.read_all().await.unwrap_or_else(|e| {
            warn!("cache read failed: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// All repository handles for one backend, sharing one transport and one
/// optional cache pool. Cheap to clone; passed explicitly to every
/// consumer instead of living in process-wide statics.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub albums: AlbumRepository,
    pub musicians: MusicianRepository,
    pub collectors: CollectorRepository,
    pub prizes: PrizeRepository,
}

impl CatalogRepositories {
    pub fn new(api: Arc<dyn CatalogApi>, cache: Option<SqlitePool>) -> Self {
        let album_store = cache
            .clone()
            .map(|pool| EntityStore::new(pool, tables::ALBUMS));
        let musician_store = cache
            .clone()
            .map(|pool| EntityStore::new(pool, tables::MUSICIANS));
        let collector_store = cache.map(|pool| EntityStore::new(pool, tables::COLLECTORS));

        Self {
            albums: AlbumRepository::new(Arc::clone(&api), album_store),
            musicians: MusicianRepository::new(Arc::clone(&api), musician_store),
            collectors: CollectorRepository::new(Arc::clone(&api), collector_store),
            prizes: PrizeRepository::new(api),
        }
    }
}

#[async_trait]
impl ListSource<Album> for AlbumRepository {
    async fn list(&self) -> Result<Vec<Album>, FetchError> {
        AlbumRepository::list(self).await
    }
}

#[async_trait]
impl GetSource<Album> for AlbumRepository {
    async fn get(&self, id: i64) -> Result<Album, FetchError> {
        AlbumRepository::get(self, id).await
    }
}

#[async_trait]
impl ListSource<Musician> for MusicianRepository {
    async fn list(&self) -> Result<Vec<Musician>, FetchError> {
        MusicianRepository::list(self).await
    }
}

#[async_trait]
impl GetSource<Musician> for MusicianRepository {
    async fn get(&self, id: i64) -> Result<Musician, FetchError> {
        MusicianRepository::get(self, id).await
    }
}

#[async_trait]
impl ListSource<Collector> for CollectorRepository {
    async fn list(&self) -> Result<Vec<Collector>, FetchError> {
        CollectorRepository::list(self).await
    }
}

#[async_trait]
impl GetSource<Collector> for CollectorRepository {
    async fn get(&self, id: i64) -> Result<Collector, FetchError> {
        CollectorRepository::get(self, id).await
    }
}

#[async_trait]
impl GetSource<Prize> for PrizeRepository {
    async fn get(&self, id: i64) -> Result<Prize, FetchError> {
        PrizeRepository::get(self, id).await
    }
}
