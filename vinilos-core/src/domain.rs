use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An entity with a backend-assigned integer id.
pub trait Identified {
    fn id(&self) -> i64;
}

/// A join record pointing from a parent entity to a child entity.
///
/// The resolvable child id follows a three-tier precedence that real
/// backend data depends on: the embedded partial child's id wins, then the
/// explicit foreign-key field, then the reference's own record id as a
/// last resort. A record carrying none of the three is malformed and
/// yields `None`.
pub trait ChildRef {
    fn child_id(&self) -> Option<i64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub release_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub record_label: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub performers: Vec<PerformerRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Musician {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub birth_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub albums: Vec<AlbumStub>,
    #[serde(default)]
    pub performer_prizes: Vec<PerformerPrizeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub favorite_performers: Vec<PerformerRef>,
    #[serde(default)]
    pub collector_albums: Vec<CollectorAlbumRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

/// Lightweight performer embedded in album and collector payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Lightweight album embedded in musician payloads and collector-album
/// references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumStub {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// Lightweight prize embedded in performer-prize references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeStub {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A prize awarded to a musician, as returned inside the musician payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerPrizeRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, with = "lenient_datetime")]
    pub premiation_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub prize_id: Option<i64>,
    #[serde(default)]
    pub prize: Option<PrizeStub>,
}

/// An album owned by a collector, as returned inside the collector payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorAlbumRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub album_id: Option<i64>,
    #[serde(default)]
    pub album: Option<AlbumStub>,
}

/// Draft album for creation. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_label: Option<String>,
}

/// Draft collector for creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollector {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Identified for Album {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Musician {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Collector {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Prize {
    fn id(&self) -> i64 {
        self.id
    }
}

impl ChildRef for PerformerPrizeRef {
    fn child_id(&self) -> Option<i64> {
        self.prize
            .as_ref()
            .map(|p| p.id)
            .or(self.prize_id)
            .or(self.id)
    }
}

impl ChildRef for CollectorAlbumRef {
    fn child_id(&self) -> Option<i64> {
        self.album
            .as_ref()
            .map(|a| a.id)
            .or(self.album_id)
            .or(self.id)
    }
}

/// Lenient (de)serialization for the backend's `yyyy-MM-ddTHH:mm:ss.SSSZ`
/// timestamps. Accepts RFC 3339, naive datetimes with or without fractional
/// seconds, and bare dates. Unparseable values become `None` rather than
/// failing the whole payload.
pub mod lenient_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::debug;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let trimmed = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.naive_utc());
        }
        let bare = trimmed.trim_end_matches('Z');
        if let Ok(dt) = NaiveDateTime::parse_from_str(bare, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(bare, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Some(dt);
            }
        }
        debug!("unparseable timestamp '{}', treating as absent", raw);
        None
    }
}
