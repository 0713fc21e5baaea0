// Champion data model shared by the sources, the dispatcher and the TUI.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Number of ability slots every champion exposes.
pub const SLOT_COUNT: usize = 4;

/// Labels for the four ability slots, in slot order.
pub const SLOT_LABELS: [&str; SLOT_COUNT] = ["Q", "W", "E", "R"];

/// Value shown for a field the backend did not provide.
pub const MISSING_VALUE: &str = "-";

/// Marker shown in every value field of a row whose lookup failed.
pub const NOT_FOUND: &str = "not found";

// ---------------------------------------------------------------------------
// ViewMode
// ---------------------------------------------------------------------------

/// Which text of an ability slot the form displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Cooldown,
    Description,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Cooldown => ViewMode::Description,
            ViewMode::Description => ViewMode::Cooldown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Cooldown => "Cooldown",
            ViewMode::Description => "Description",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

/// Raw bytes of a square image fetched from the remote image endpoint.
///
/// Cloning is cheap: the bytes are shared with the source's icon cache.
#[derive(Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl Icon {
    pub fn new(name: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        Icon {
            name: name.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Icon")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ChampionRecord
// ---------------------------------------------------------------------------

/// One ability position of a champion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilitySlot {
    /// Column or slot label (`Q`, `W`, ... or a CSV header name).
    pub label: String,
    pub cooldown: String,
    pub description: String,
    /// Image file name on the remote image endpoint, if the backend has one.
    pub icon_ref: Option<String>,
    /// Fetched icon bytes. Always `None` for the CSV backend.
    pub icon: Option<Icon>,
}

impl AbilitySlot {
    /// A slot whose cooldown and description are the same text, as the CSV
    /// backend produces.
    pub fn plain(label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        AbilitySlot {
            label: label.into(),
            cooldown: value.clone(),
            description: value,
            icon_ref: None,
            icon: None,
        }
    }

    pub fn text(&self, mode: ViewMode) -> &str {
        match mode {
            ViewMode::Cooldown => &self.cooldown,
            ViewMode::Description => &self.description,
        }
    }
}

/// Ability data for a single champion. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChampionRecord {
    pub canonical_id: String,
    pub display_name: String,
    pub slots: Vec<AbilitySlot>,
    pub portrait_ref: Option<String>,
    pub portrait: Option<Icon>,
}

impl ChampionRecord {
    /// The displayed value for each of the four slots in `mode`.
    ///
    /// Records with fewer than four slots are padded with `-`; extra slots
    /// are ignored.
    pub fn values(&self, mode: ViewMode) -> [String; SLOT_COUNT] {
        std::array::from_fn(|i| {
            self.slots
                .get(i)
                .map(|slot| slot.text(mode).to_string())
                .unwrap_or_else(|| MISSING_VALUE.to_string())
        })
    }

    /// Slot icons, or `None` when the record carries no icon at all.
    pub fn icons(&self) -> Option<[Option<Icon>; SLOT_COUNT]> {
        if self.slots.iter().all(|slot| slot.icon.is_none()) {
            return None;
        }
        Some(std::array::from_fn(|i| {
            self.slots.get(i).and_then(|slot| slot.icon.clone())
        }))
    }
}

// ---------------------------------------------------------------------------
// Lookup messages
// ---------------------------------------------------------------------------

/// A request to look up the champion typed into one form row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub row_index: usize,
    pub raw_name: String,
    pub view_mode: ViewMode,
}

/// The outcome of one lookup, tagged with the row it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub row_index: usize,
    pub found: bool,
    /// Champion display name when found.
    pub champion: Option<String>,
    pub values: [String; SLOT_COUNT],
    pub icons: Option<[Option<Icon>; SLOT_COUNT]>,
}

impl LookupResult {
    pub fn found(row_index: usize, record: &ChampionRecord, mode: ViewMode) -> Self {
        LookupResult {
            row_index,
            found: true,
            champion: Some(record.display_name.clone()),
            values: record.values(mode),
            icons: record.icons(),
        }
    }

    pub fn not_found(row_index: usize) -> Self {
        LookupResult {
            row_index,
            found: false,
            champion: None,
            values: std::array::from_fn(|_| NOT_FOUND.to_string()),
            icons: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
