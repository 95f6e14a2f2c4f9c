use std::collections::BTreeMap;

/// Human-readable identity of one synoptic weather type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwtLabel {
    /// Weather-regime category code, e.g. "WH" or "COL".
    pub regime: &'static str,
    /// Subtype letter within the regime.
    pub subtype: &'static str,
    /// Display colour, 8-bit RGB.
    pub color: (u8, u8, u8),
}

/// Read-only lookup table from cluster id to weather-type label.
///
/// The catalog is handed to the assignment path rather than baked into it,
/// so alternative cluster sets can carry their own tables.
#[derive(Debug, Clone, Default)]
pub struct SwtCatalog {
    entries: BTreeMap<u32, SwtLabel>,
}

impl SwtCatalog {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, cluster_id: u32, label: SwtLabel) {
        self.entries.insert(cluster_id, label);
    }

    pub fn lookup(&self, cluster_id: u32) -> Option<&SwtLabel> {
        self.entries.get(&cluster_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The 30-type Australian-region 850hPa catalog.
    pub fn australian_850() -> Self {
        let mut catalog = Self::new();
        for &(cluster_id, regime, subtype, color) in AUSTRALIAN_850_TYPES {
            catalog.insert(
                cluster_id,
                SwtLabel {
                    regime,
                    subtype,
                    color,
                },
            );
        }
        catalog
    }
}

/// Cluster id, regime code, subtype, display colour.
const AUSTRALIAN_850_TYPES: &[(u32, &str, &str, (u8, u8, u8))] = &[
    (23, "WH", "A", (134, 0, 34)),
    (5, "WH", "B", (241, 0, 241)),
    (19, "WH", "C", (255, 134, 255)),
    (1, "WH", "D", (255, 241, 255)),
    (17, "CH", "A", (255, 204, 51)),
    (6, "CH", "B", (255, 245, 204)),
    (15, "EH", "A", (153, 15, 15)),
    (10, "EH", "B", (178, 44, 44)),
    (29, "EH", "C", (204, 81, 81)),
    (11, "EH", "D", (229, 126, 126)),
    (20, "EH", "E", (255, 178, 178)),
    (16, "TH", "A", (153, 84, 15)),
    (28, "TH", "B", (204, 142, 81)),
    (4, "TH", "C", (255, 216, 178)),
    (18, "FH", "A", (107, 153, 15)),
    (22, "FH", "B", (163, 204, 81)),
    (12, "FH", "C", (195, 229, 126)),
    (21, "WCT", "A", (66, 44, 178)),
    (25, "WCT", "B", (143, 126, 229)),
    (14, "COL", "A", (5, 67, 113)),
    (7, "COL", "B", (15, 107, 153)),
    (9, "COL", "C", (44, 133, 178)),
    (30, "COL", "D", (81, 163, 204)),
    (27, "COL", "E", (126, 195, 229)),
    (13, "COL", "F", (178, 229, 255)),
    (24, "AM", "A", (0, 60, 48)),
    (26, "AM", "B", (1, 102, 95)),
    (2, "AM", "C", (53, 151, 143)),
    (8, "AM", "D", (128, 205, 193)),
    (3, "AM", "E", (199, 234, 229)),
];
