// Remote backend: Riot Data Dragon JSON API.
//
// A lookup is a two-step fetch. The champion name is first mapped to its
// API key through the version-pinned champion list, then the per-champion
// payload is fetched by key and version. Payloads and icon bytes are memoized
// for the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::http::HttpFetch;
use super::{AbilitySource, LookupError};
use crate::champion::{
    AbilitySlot, ChampionRecord, Icon, ViewMode, MISSING_VALUE, SLOT_COUNT, SLOT_LABELS,
};
use crate::config::RemoteConfig;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Folder of the image endpoint an icon lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Champion,
    Spell,
}

impl ImageKind {
    fn path_segment(self) -> &'static str {
        match self {
            ImageKind::Champion => "champion",
            ImageKind::Spell => "spell",
        }
    }
}

/// One entry of the per-version champion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChampionEntry {
    /// API key used in per-champion URLs (`MonkeyKing`).
    pub key: String,
    /// Display name (`Wukong`).
    pub name: String,
}

// ---------------------------------------------------------------------------
// DataDragonApi
// ---------------------------------------------------------------------------

/// Thin typed wrapper over the three Data Dragon endpoints.
pub struct DataDragonApi {
    http: Arc<dyn HttpFetch>,
    urls: RemoteConfig,
}

impl DataDragonApi {
    pub fn new(http: Arc<dyn HttpFetch>, urls: RemoteConfig) -> Self {
        Self { http, urls }
    }

    /// The newest game version (first entry of the version list).
    pub async fn latest_version(&self) -> Result<String, LookupError> {
        let json = self.http.get_json(&self.urls.versions_url).await?;
        parse_latest_version(&json)
    }

    pub async fn champion_list(&self, version: &str) -> Result<Vec<ChampionEntry>, LookupError> {
        let url = self.urls.champion_list_url.replace("{version}", version);
        let json = self.http.get_json(&url).await?;
        parse_champion_list(&json)
    }

    pub async fn champion_detail(&self, version: &str, key: &str) -> Result<Value, LookupError> {
        let url = self
            .urls
            .champion_detail_url
            .replace("{version}", version)
            .replace("{key}", key);
        Ok(self.http.get_json(&url).await?)
    }

    pub async fn image(
        &self,
        version: &str,
        kind: ImageKind,
        image: &str,
    ) -> Result<Vec<u8>, LookupError> {
        let url = self
            .urls
            .image_url
            .replace("{version}", version)
            .replace("{kind}", kind.path_segment())
            .replace("{image}", image);
        Ok(self.http.get_bytes(&url).await?)
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

pub fn parse_latest_version(json: &Value) -> Result<String, LookupError> {
    json.as_array()
        .and_then(|versions| versions.first())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LookupError::Malformed("version list is empty or not an array".into()))
}

pub fn parse_champion_list(json: &Value) -> Result<Vec<ChampionEntry>, LookupError> {
    let data = json
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| LookupError::Malformed("champion list has no `data` object".into()))?;

    Ok(data
        .iter()
        .map(|(map_key, champ)| ChampionEntry {
            key: str_field(champ, "id").unwrap_or(map_key.as_str()).to_string(),
            name: str_field(champ, "name").unwrap_or(map_key.as_str()).to_string(),
        })
        .collect())
}

/// Extract the four spells of the champion `key` from a detail payload.
/// Icons are referenced by file name but not fetched.
pub fn parse_champion_detail(json: &Value, key: &str) -> Result<ChampionRecord, LookupError> {
    let data = json
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| LookupError::Malformed(format!("detail for {key} has no `data` object")))?;
    let champ = data
        .get(key)
        .or_else(|| {
            data.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .ok_or_else(|| LookupError::NotFound(key.to_string()))?;

    let spells: &[Value] = champ
        .get("spells")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let slots = (0..SLOT_COUNT)
        .map(|i| {
            let spell = spells.get(i);
            let cooldown = spell
                .and_then(|s| str_field(s, "cooldownBurn"))
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING_VALUE)
                .to_string();
            let description = spell
                .and_then(|s| {
                    str_field(s, "description")
                        .filter(|d| !d.is_empty())
                        .or_else(|| str_field(s, "tooltip"))
                })
                .map(strip_markup)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| MISSING_VALUE.to_string());
            AbilitySlot {
                label: SLOT_LABELS[i].to_string(),
                cooldown,
                description,
                icon_ref: spell.and_then(image_name),
                icon: None,
            }
        })
        .collect();

    Ok(ChampionRecord {
        canonical_id: str_field(champ, "id").unwrap_or(key).to_string(),
        display_name: str_field(champ, "name").unwrap_or(key).to_string(),
        slots,
        portrait_ref: image_name(champ),
        portrait: None,
    })
}

/// Remove markup tags from tooltip text and collapse whitespace. Line-break
/// tags become spaces.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut tag = String::new();
    for c in text.chars() {
        if in_tag {
            if c == '>' {
                if tag.trim_start_matches('/').to_ascii_lowercase().starts_with("br") {
                    out.push(' ');
                }
                in_tag = false;
                tag.clear();
            } else {
                tag.push(c);
            }
        } else if c == '<' {
            in_tag = true;
        } else {
            out.push(c);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

fn image_name(value: &Value) -> Option<String> {
    value
        .get("image")
        .and_then(|image| str_field(image, "full"))
        .map(str::to_string)
}

/// Lookup variants of a champion name: lowercased, without spaces, and with
/// only alphanumerics kept (`Kai'Sa` -> `kaisa`).
fn name_variants(name: &str) -> [String; 3] {
    let lower = name.trim().to_lowercase();
    let compact = lower.replace(' ', "");
    let alnum = lower.chars().filter(|c| c.is_alphanumeric()).collect();
    [lower, compact, alnum]
}

fn index_keys(entries: &[ChampionEntry]) -> HashMap<String, String> {
    let mut keys = HashMap::new();
    for entry in entries {
        for variant in name_variants(&entry.name)
            .into_iter()
            .chain(name_variants(&entry.key))
        {
            keys.entry(variant).or_insert_with(|| entry.key.clone());
        }
    }
    keys
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// RemoteSource
// ---------------------------------------------------------------------------

/// `AbilitySource` backed by Data Dragon.
///
/// The game version is pinned on first use. Concurrent misses on the same
/// cache entry may both fetch; whichever finishes last wins, and the two
/// values are identical.
pub struct RemoteSource {
    api: DataDragonApi,
    fetch_icons: bool,
    version: OnceCell<String>,
    keys: OnceCell<HashMap<String, String>>,
    details: Mutex<HashMap<(String, String), Arc<Value>>>,
    icons: Mutex<HashMap<String, Option<Arc<[u8]>>>>,
}

impl RemoteSource {
    pub fn new(api: DataDragonApi, fetch_icons: bool) -> Self {
        Self {
            api,
            fetch_icons,
            version: OnceCell::new(),
            keys: OnceCell::new(),
            details: Mutex::new(HashMap::new()),
            icons: Mutex::new(HashMap::new()),
        }
    }

    async fn version(&self) -> Result<&str, LookupError> {
        let version = self
            .version
            .get_or_try_init(|| async {
                let version = self.api.latest_version().await?;
                info!("Pinned remote data version {}", version);
                Ok::<_, LookupError>(version)
            })
            .await?;
        Ok(version.as_str())
    }

    async fn key_for(&self, version: &str, name: &str) -> Result<String, LookupError> {
        let keys = self
            .keys
            .get_or_try_init(|| async {
                let entries = self.api.champion_list(version).await?;
                Ok::<_, LookupError>(index_keys(&entries))
            })
            .await?;

        name_variants(name)
            .iter()
            .find_map(|variant| keys.get(variant))
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }

    async fn detail(&self, version: &str, key: &str) -> Result<Arc<Value>, LookupError> {
        let cache_key = (key.to_string(), version.to_string());
        let cached = lock(&self.details).get(&cache_key).cloned();
        if let Some(json) = cached {
            return Ok(json);
        }

        let json = Arc::new(self.api.champion_detail(version, key).await?);
        lock(&self.details).insert(cache_key, Arc::clone(&json));
        Ok(json)
    }

    /// Icon bytes for `image`. Failures are memoized as `None` so a stalled
    /// image endpoint costs one timeout per image, not one per lookup.
    async fn icon(&self, version: &str, kind: ImageKind, image: &str) -> Option<Icon> {
        let cached = lock(&self.icons).get(image).cloned();
        if let Some(entry) = cached {
            return entry.map(|bytes| Icon::new(image, bytes));
        }

        let bytes = match self.api.image(version, kind, image).await {
            Ok(bytes) => Some(Arc::<[u8]>::from(bytes)),
            Err(e) => {
                debug!("icon {} unavailable: {}", image, e);
                None
            }
        };
        lock(&self.icons).insert(image.to_string(), bytes.clone());
        bytes.map(|bytes| Icon::new(image, bytes))
    }

    async fn maybe_icon(&self, version: &str, kind: ImageKind, image: Option<&str>) -> Option<Icon> {
        match image {
            Some(image) => self.icon(version, kind, image).await,
            None => None,
        }
    }

    /// Number of memoized champion payloads.
    pub fn cached_details(&self) -> usize {
        lock(&self.details).len()
    }

    /// Number of memoized icons, not counting remembered failures.
    pub fn cached_icons(&self) -> usize {
        lock(&self.icons).values().filter(|bytes| bytes.is_some()).count()
    }
}

#[async_trait]
impl AbilitySource for RemoteSource {
    async fn fetch_abilities(
        &self,
        canonical_id: &str,
        view_mode: ViewMode,
    ) -> Result<ChampionRecord, LookupError> {
        let version = self.version().await?.to_string();
        let key = self.key_for(&version, canonical_id).await?;
        let json = self.detail(&version, &key).await?;
        let mut record = parse_champion_detail(&json, &key)?;

        if self.fetch_icons {
            let version_ref = version.as_str();
            let portrait =
                self.maybe_icon(version_ref, ImageKind::Champion, record.portrait_ref.as_deref());
            let spells = join_all(record.slots.iter().map(move |slot| {
                self.maybe_icon(version_ref, ImageKind::Spell, slot.icon_ref.as_deref())
            }));
            let (portrait, spell_icons) = tokio::join!(portrait, spells);

            record.portrait = portrait;
            for (slot, icon) in record.slots.iter_mut().zip(spell_icons) {
                slot.icon = icon;
            }
        }

        debug!(
            champion = %record.display_name,
            %version,
            mode = %view_mode,
            "fetched remote abilities"
        );
        Ok(record)
    }

    fn columns(&self) -> Vec<String> {
        SLOT_LABELS.iter().map(|label| label.to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::http::fake::FakeFetch;
    use serde_json::json;

    const VERSIONS: &str = "http://dd/versions.json";
    const LIST: &str = "http://dd/14.1.1/champion.json";
    const AHRI: &str = "http://dd/14.1.1/champion/Ahri.json";
    const WUKONG: &str = "http://dd/14.1.1/champion/MonkeyKing.json";

    fn urls() -> RemoteConfig {
        RemoteConfig {
            versions_url: VERSIONS.into(),
            champion_list_url: "http://dd/{version}/champion.json".into(),
            champion_detail_url: "http://dd/{version}/champion/{key}.json".into(),
            image_url: "http://dd/{version}/img/{kind}/{image}".into(),
            timeout_secs: 1,
            fetch_icons: true,
        }
    }

    fn ahri_detail() -> Value {
        json!({
            "data": {
                "Ahri": {
                    "id": "Ahri",
                    "name": "Ahri",
                    "image": { "full": "Ahri.png" },
                    "spells": [
                        { "cooldownBurn": "7", "description": "Ahri sends out <b>an orb</b>.", "image": { "full": "AhriQ.png" } },
                        { "cooldownBurn": "9", "description": "Fox-Fire.<br><br>Seeks enemies.", "image": { "full": "AhriW.png" } },
                        { "cooldownBurn": "12", "tooltip": "Charm", "image": { "full": "AhriE.png" } },
                        { "cooldownBurn": "130/105/80", "description": "Spirit Rush", "image": { "full": "AhriR.png" } }
                    ]
                }
            }
        })
    }

    fn fake() -> FakeFetch {
        FakeFetch::default()
            .with_json(VERSIONS, json!(["14.1.1", "13.24.1"]))
            .with_json(
                LIST,
                json!({ "data": {
                    "Ahri": { "id": "Ahri", "name": "Ahri" },
                    "MonkeyKing": { "id": "MonkeyKing", "name": "Wukong" }
                }}),
            )
            .with_json(AHRI, ahri_detail())
            .with_json(
                WUKONG,
                json!({ "data": { "MonkeyKing": { "id": "MonkeyKing", "name": "Wukong", "spells": [
                    { "cooldownBurn": "8" }
                ]}}}),
            )
            .with_bytes("http://dd/14.1.1/img/spell/AhriQ.png", b"qq")
            .with_bytes("http://dd/14.1.1/img/champion/Ahri.png", b"portrait")
    }

    fn source(http: Arc<FakeFetch>, fetch_icons: bool) -> RemoteSource {
        RemoteSource::new(DataDragonApi::new(http, urls()), fetch_icons)
    }

    #[test]
    fn latest_version_is_first_entry() {
        assert_eq!(parse_latest_version(&json!(["14.2.1", "14.1.1"])).unwrap(), "14.2.1");
        assert!(parse_latest_version(&json!([])).is_err());
        assert!(parse_latest_version(&json!({ "v": 1 })).is_err());
    }

    #[test]
    fn champion_list_uses_id_and_name() {
        let entries = parse_champion_list(&json!({ "data": {
            "MonkeyKing": { "id": "MonkeyKing", "name": "Wukong" }
        }}))
        .unwrap();
        assert_eq!(
            entries,
            vec![ChampionEntry {
                key: "MonkeyKing".into(),
                name: "Wukong".into()
            }]
        );
        assert!(parse_champion_list(&json!([])).is_err());
    }

    #[test]
    fn detail_extracts_slots_in_order() {
        let rec = parse_champion_detail(&ahri_detail(), "Ahri").unwrap();
        assert_eq!(rec.values(ViewMode::Cooldown), ["7", "9", "12", "130/105/80"]);
        assert_eq!(
            rec.values(ViewMode::Description),
            [
                "Ahri sends out an orb.",
                "Fox-Fire. Seeks enemies.",
                "Charm",
                "Spirit Rush"
            ]
        );
        assert_eq!(rec.slots[0].label, "Q");
        assert_eq!(rec.slots[3].label, "R");
        assert_eq!(rec.slots[2].icon_ref.as_deref(), Some("AhriE.png"));
        assert_eq!(rec.portrait_ref.as_deref(), Some("Ahri.png"));
    }

    #[test]
    fn absent_fields_default_to_placeholder() {
        let json = json!({ "data": { "Zed": { "name": "Zed", "spells": [ { "description": "" } ] } } });
        let rec = parse_champion_detail(&json, "Zed").unwrap();
        assert_eq!(rec.values(ViewMode::Cooldown), ["-", "-", "-", "-"]);
        assert_eq!(rec.values(ViewMode::Description), ["-", "-", "-", "-"]);
        assert!(rec.portrait_ref.is_none());
    }

    #[test]
    fn strip_markup_removes_tags() {
        assert_eq!(
            strip_markup("Deals <magicDamage>40</magicDamage> damage.<br /><br>Then  more"),
            "Deals 40 damage. Then more"
        );
        assert_eq!(strip_markup("plain"), "plain");
    }

    #[tokio::test]
    async fn two_step_fetch_resolves_display_name_to_key() {
        let http = Arc::new(fake());
        let src = source(Arc::clone(&http), false);

        let rec = src.fetch_abilities("Wukong", ViewMode::Cooldown).await.unwrap();
        assert_eq!(rec.canonical_id, "MonkeyKing");
        assert_eq!(rec.values(ViewMode::Cooldown), ["8", "-", "-", "-"]);
        assert_eq!(http.hits(WUKONG), 1);
    }

    #[tokio::test]
    async fn detail_and_directory_are_memoized() {
        let http = Arc::new(fake());
        let src = source(Arc::clone(&http), false);

        src.fetch_abilities("Ahri", ViewMode::Cooldown).await.unwrap();
        src.fetch_abilities("ahri", ViewMode::Description).await.unwrap();

        assert_eq!(http.hits(VERSIONS), 1);
        assert_eq!(http.hits(LIST), 1);
        assert_eq!(http.hits(AHRI), 1);
        assert_eq!(src.cached_details(), 1);
    }

    #[tokio::test]
    async fn icon_failures_degrade_to_none() {
        let http = Arc::new(fake());
        let src = source(Arc::clone(&http), true);

        let rec = src.fetch_abilities("Ahri", ViewMode::Cooldown).await.unwrap();
        let icons = rec.icons().expect("Q icon is served");
        assert_eq!(icons[0].as_ref().unwrap().bytes.as_ref(), b"qq");
        assert!(icons[1].is_none());
        assert!(icons[3].is_none());
        assert_eq!(rec.portrait.as_ref().unwrap().len(), 8);

        // Second fetch is served from the icon cache.
        src.fetch_abilities("Ahri", ViewMode::Cooldown).await.unwrap();
        assert_eq!(http.hits("http://dd/14.1.1/img/spell/AhriQ.png"), 1);
        assert_eq!(src.cached_icons(), 2);
    }

    #[tokio::test]
    async fn failed_icons_are_not_refetched() {
        let http = Arc::new(fake());
        let src = source(Arc::clone(&http), true);

        for _ in 0..3 {
            let rec = src.fetch_abilities("Ahri", ViewMode::Cooldown).await.unwrap();
            assert!(rec.slots[1].icon.is_none());
        }
        assert_eq!(http.hits("http://dd/14.1.1/img/spell/AhriW.png"), 1);
        assert_eq!(http.hits("http://dd/14.1.1/img/spell/AhriR.png"), 1);
    }

    #[tokio::test]
    async fn unknown_champion_is_not_found() {
        let src = source(Arc::new(fake()), false);
        let err = src.fetch_abilities("Teemo", ViewMode::Cooldown).await.unwrap_err();
        assert_eq!(err, LookupError::NotFound("Teemo".into()));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_fetch_error() {
        let src = source(Arc::new(FakeFetch::default()), false);
        let err = src.fetch_abilities("Ahri", ViewMode::Cooldown).await.unwrap_err();
        assert!(matches!(err, LookupError::Fetch(_)));
    }
}
