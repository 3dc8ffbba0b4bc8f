//! Scriptable in-memory backend and fixture builders for behavioral tests.
//! Compiled only with the `test-utils` feature.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, CatalogApi};
use crate::domain::{Album, Collector, Musician, NewAlbum, NewCollector, Prize};

struct Shelf<T> {
    items: Vec<T>,
    fail_list: bool,
    fail_writes: bool,
    failing_ids: HashSet<i64>,
    delays: HashMap<i64, Duration>,
}

impl<T> Default for Shelf<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            fail_list: false,
            fail_writes: false,
            failing_ids: HashSet::new(),
            delays: HashMap::new(),
        }
    }
}

/// In-memory [`CatalogApi`] whose responses are scripted per test:
/// seed items, mark endpoints or ids as failing, add per-id latency.
#[derive(Default)]
pub struct ScriptedApi {
    albums: Mutex<Shelf<Album>>,
    musicians: Mutex<Shelf<Musician>>,
    collectors: Mutex<Shelf<Collector>>,
    prizes: Mutex<Shelf<Prize>>,
    associations: Mutex<Vec<(i64, i64)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_albums(&self, items: Vec<Album>) {
        self.albums.lock().unwrap().items = items;
    }

    pub fn fail_album_list(&self, fail: bool) {
        self.albums.lock().unwrap().fail_list = fail;
    }

    pub fn fail_album_writes(&self, fail: bool) {
        self.albums.lock().unwrap().fail_writes = fail;
    }

    pub fn fail_album(&self, id: i64) {
        self.albums.lock().unwrap().failing_ids.insert(id);
    }

    pub fn clear_album_failures(&self) {
        self.albums.lock().unwrap().failing_ids.clear();
    }

    pub fn delay_album(&self, id: i64, delay: Duration) {
        self.albums.lock().unwrap().delays.insert(id, delay);
    }

    pub fn set_musicians(&self, items: Vec<Musician>) {
        self.musicians.lock().unwrap().items = items;
    }

    pub fn set_collectors(&self, items: Vec<Collector>) {
        self.collectors.lock().unwrap().items = items;
    }

    pub fn set_prizes(&self, items: Vec<Prize>) {
        self.prizes.lock().unwrap().items = items;
    }

    pub fn fail_prize(&self, id: i64) {
        self.prizes.lock().unwrap().failing_ids.insert(id);
    }

    pub fn delay_prize(&self, id: i64, delay: Duration) {
        self.prizes.lock().unwrap().delays.insert(id, delay);
    }

    /// `(album_id, musician_id)` pairs recorded by successful associates.
    pub fn associations(&self) -> Vec<(i64, i64)> {
        self.associations.lock().unwrap().clone()
    }
}

fn list_from<T: Clone>(shelf: &Mutex<Shelf<T>>) -> Result<Vec<T>, ApiError> {
    let shelf = shelf.lock().unwrap();
    if shelf.fail_list {
        return Err(ApiError::Server { status: 503 });
    }
    Ok(shelf.items.clone())
}

async fn get_from<T, F>(
    shelf: &Mutex<Shelf<T>>,
    id: i64,
    resource: &str,
    find: F,
) -> Result<T, ApiError>
where
    T: Clone,
    F: Fn(&T) -> i64,
{
    let (result, delay) = {
        let shelf = shelf.lock().unwrap();
        let delay = shelf.delays.get(&id).copied();
        let result = if shelf.failing_ids.contains(&id) {
            Err(ApiError::Server { status: 500 })
        } else {
            match shelf.items.iter().find(|item| find(item) == id) {
                Some(item) => Ok(item.clone()),
                None => Err(ApiError::NotFound {
                    resource: format!("{} {}", resource, id),
                }),
            }
        };
        (result, delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    result
}

fn next_id<T, F: Fn(&T) -> i64>(items: &[T], id_of: F) -> i64 {
    items.iter().map(id_of).max().unwrap_or(0) + 1
}

#[async_trait]
impl CatalogApi for ScriptedApi {
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError> {
        list_from(&self.albums)
    }

    async fn get_album(&self, id: i64) -> Result<Album, ApiError> {
        get_from(&self.albums, id, "album", |a| a.id).await
    }

    async fn create_album(&self, draft: &NewAlbum) -> Result<Album, ApiError> {
        let mut shelf = self.albums.lock().unwrap();
        if shelf.fail_writes {
            return Err(ApiError::Server { status: 500 });
        }
        let album = Album {
            id: next_id(&shelf.items, |a| a.id),
            name: draft.name.clone(),
            cover: draft.cover.clone(),
            release_date: draft.release_date,
            description: draft.description.clone(),
            genre: draft.genre.clone(),
            record_label: draft.record_label.clone(),
            tracks: Vec::new(),
            performers: Vec::new(),
            comments: Vec::new(),
        };
        shelf.items.push(album.clone());
        Ok(album)
    }

    async fn list_musicians(&self) -> Result<Vec<Musician>, ApiError> {
        list_from(&self.musicians)
    }

    async fn get_musician(&self, id: i64) -> Result<Musician, ApiError> {
        get_from(&self.musicians, id, "musician", |m| m.id).await
    }

    async fn list_collectors(&self) -> Result<Vec<Collector>, ApiError> {
        list_from(&self.collectors)
    }

    async fn get_collector(&self, id: i64) -> Result<Collector, ApiError> {
        get_from(&self.collectors, id, "collector", |c| c.id).await
    }

    async fn create_collector(&self, draft: &NewCollector) -> Result<Collector, ApiError> {
        let mut shelf = self.collectors.lock().unwrap();
        if shelf.fail_writes {
            return Err(ApiError::Server { status: 500 });
        }
        let collector = Collector {
            id: next_id(&shelf.items, |c| c.id),
            name: draft.name.clone(),
            telephone: draft.telephone.clone(),
            email: draft.email.clone(),
            comments: draft.comments.clone(),
            favorite_performers: Vec::new(),
            collector_albums: Vec::new(),
        };
        shelf.items.push(collector.clone());
        Ok(collector)
    }

    async fn get_prize(&self, id: i64) -> Result<Prize, ApiError> {
        get_from(&self.prizes, id, "prize", |p| p.id).await
    }

    async fn add_musician_to_album(
        &self,
        album_id: i64,
        musician_id: i64,
    ) -> Result<(), ApiError> {
        {
            let shelf = self.albums.lock().unwrap();
            if shelf.fail_writes {
                return Err(ApiError::Server { status: 500 });
            }
            if !shelf.items.iter().any(|a| a.id == album_id) {
                return Err(ApiError::NotFound {
                    resource: format!("album {}", album_id),
                });
            }
        }
        self.associations.lock().unwrap().push((album_id, musician_id));
        Ok(())
    }
}

pub fn album(id: i64, name: &str) -> Album {
    Album {
        id,
        name: name.to_string(),
        cover: None,
        release_date: None,
        description: None,
        genre: None,
        record_label: None,
        tracks: Vec::new(),
        performers: Vec::new(),
        comments: Vec::new(),
    }
}

pub fn musician(id: i64, name: &str) -> Musician {
    Musician {
        id,
        name: name.to_string(),
        image: None,
        description: None,
        birth_date: None,
        albums: Vec::new(),
        performer_prizes: Vec::new(),
    }
}

pub fn collector(id: i64, name: &str) -> Collector {
    Collector {
        id,
        name: name.to_string(),
        telephone: None,
        email: None,
        comments: None,
        favorite_performers: Vec::new(),
        collector_albums: Vec::new(),
    }
}

pub fn prize(id: i64, name: &str) -> Prize {
    Prize {
        id,
        name: name.to_string(),
        description: None,
        organization: None,
    }
}
