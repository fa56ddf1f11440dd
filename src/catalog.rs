//! Static category registry mapping a category identifier to its target
//! table and external-field dictionary.
//!
//! Monitoring and enhancement tables have heterogeneous, hand-curated
//! measurement columns that cannot be inferred from the database alone, so
//! they are enumerated once here. Reference tables carry only a target-table
//! name; their columns are resolved live at approval time (`db::schema`).

use std::collections::{BTreeMap, HashMap};

use crate::models::CategoryKind;

/// Catalog revision, bumped whenever the dictionaries change.
pub const CATALOG_VERSION: &str = "2026.1";

/// Reference table whose rows need a year derived from their start date.
pub const PERIOD_REFERENCE_TABLE: &str = "Periods";

/// External field carrying the start date on period reference uploads.
pub const PERIOD_START_DATE_FIELD: &str = "start_date";

/// Relational columns every monitoring/enhancement upload carries in
/// addition to its measurement columns.
const COMMON_FIELDS: &[(&str, &str)] = &[
    ("station_id", "station_id"),
    ("company_id", "company_id"),
    ("reportBy", "report_by"),
];

/// Monitoring sub-categories: (category id, target table, measurement fields).
const MONITORING: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "SO2",
        "Env_Wind_SO2",
        &[
            ("day1st_result_ppm", "day1st_result_ppm"),
            ("day2nd_result_ppm", "day2nd_result_ppm"),
            ("day3rd_result_ppm", "day3rd_result_ppm"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "NO2",
        "Env_Wind_NO2",
        &[
            ("day1st_result_ppm", "day1st_result_ppm"),
            ("day2nd_result_ppm", "day2nd_result_ppm"),
            ("day3rd_result_ppm", "day3rd_result_ppm"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "CO",
        "Env_Wind_CO",
        &[
            ("day1st_result_ppm", "day1st_result_ppm"),
            ("day2nd_result_ppm", "day2nd_result_ppm"),
            ("day3rd_result_ppm", "day3rd_result_ppm"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "O3",
        "Env_Wind_O3",
        &[
            ("day1st_result_ppm", "day1st_result_ppm"),
            ("day2nd_result_ppm", "day2nd_result_ppm"),
            ("day3rd_result_ppm", "day3rd_result_ppm"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "TSP",
        "Env_Wind_TSP",
        &[
            ("day1st_result_mgm3", "day1st_result_mgm3"),
            ("day2nd_result_mgm3", "day2nd_result_mgm3"),
            ("day3rd_result_mgm3", "day3rd_result_mgm3"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "PM10",
        "Env_Wind_PM10",
        &[
            ("day1st_result_mgm3", "day1st_result_mgm3"),
            ("day2nd_result_mgm3", "day2nd_result_mgm3"),
            ("day3rd_result_mgm3", "day3rd_result_mgm3"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "WindSpeed",
        "Env_Wind_Speed",
        &[
            ("avg_speed_ms", "avg_speed_ms"),
            ("max_speed_ms", "max_speed_ms"),
            ("direction", "direction"),
        ],
    ),
    (
        "Leq24",
        "Env_Noise_Leq24",
        &[
            ("day1st_Leq", "day1st_Leq"),
            ("day2nd_Leq", "day2nd_Leq"),
            ("day3rd_Leq", "day3rd_Leq"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "Lmax",
        "Env_Noise_Lmax",
        &[
            ("day1st_Lmax", "day1st_Lmax"),
            ("day2nd_Lmax", "day2nd_Lmax"),
            ("day3rd_Lmax", "day3rd_Lmax"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "Ldn",
        "Env_Noise_Ldn",
        &[
            ("day1st_Ldn", "day1st_Ldn"),
            ("day2nd_Ldn", "day2nd_Ldn"),
            ("day3rd_Ldn", "day3rd_Ldn"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "Vibration",
        "Env_Vibration_PPV",
        &[
            ("ppv_mms", "ppv_mms"),
            ("freq_hz", "freq_hz"),
            ("std_value", "std_value"),
        ],
    ),
    (
        "SurfaceWater",
        "Env_Water_Surface",
        &[
            ("ph_value", "ph_value"),
            ("bod_mgl", "bod_mgl"),
            ("do_mgl", "do_mgl"),
            ("ss_mgl", "ss_mgl"),
            ("temperature_c", "temperature_c"),
        ],
    ),
    (
        "GroundWater",
        "Env_Water_Ground",
        &[
            ("ph_value", "ph_value"),
            ("hardness_mgl", "hardness_mgl"),
            ("tds_mgl", "tds_mgl"),
            ("coliform_mpn", "coliform_mpn"),
        ],
    ),
    (
        "WasteWater",
        "Env_Water_Waste",
        &[
            ("ph_value", "ph_value"),
            ("bod_mgl", "bod_mgl"),
            ("cod_mgl", "cod_mgl"),
            ("ss_mgl", "ss_mgl"),
            ("oil_grease_mgl", "oil_grease_mgl"),
        ],
    ),
    (
        "Seawater",
        "Env_Water_Sea",
        &[
            ("ph_value", "ph_value"),
            ("do_mgl", "do_mgl"),
            ("salinity_ppt", "salinity_ppt"),
            ("temperature_c", "temperature_c"),
        ],
    ),
];

/// Enhancement sub-tables: (enhancement id, target table, fields).
const ENHANCEMENT: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "GreenArea",
        "Env_Enhance_GreenArea",
        &[
            ("activity", "activity"),
            ("area_sqm", "area_sqm"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "TreePlanting",
        "Env_Enhance_TreePlanting",
        &[
            ("activity", "activity"),
            ("tree_count", "tree_count"),
            ("species", "species"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "DustControl",
        "Env_Enhance_DustControl",
        &[
            ("activity", "activity"),
            ("method", "method"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "NoiseBarrier",
        "Env_Enhance_NoiseBarrier",
        &[
            ("activity", "activity"),
            ("length_m", "length_m"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "WaterTreatment",
        "Env_Enhance_WaterTreatment",
        &[
            ("activity", "activity"),
            ("volume_m3", "volume_m3"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "WasteSorting",
        "Env_Enhance_WasteSorting",
        &[
            ("activity", "activity"),
            ("tonnage", "tonnage"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "EnergySaving",
        "Env_Enhance_EnergySaving",
        &[
            ("activity", "activity"),
            ("kwh_saved", "kwh_saved"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "OdorControl",
        "Env_Enhance_OdorControl",
        &[
            ("activity", "activity"),
            ("method", "method"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "ErosionControl",
        "Env_Enhance_ErosionControl",
        &[
            ("activity", "activity"),
            ("area_sqm", "area_sqm"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
    (
        "CommunityOutreach",
        "Env_Enhance_CommunityOutreach",
        &[
            ("activity", "activity"),
            ("participants", "participants"),
            ("result", "result"),
            ("progress_pct", "progress_pct"),
        ],
    ),
];

/// Reference lookup tables: columns come from live introspection, not from
/// a dictionary.
const REFERENCE: &[(&str, &str)] = &[
    ("Years", "Years"),
    ("Periods", "Periods"),
    ("MainCategories", "MainCategories"),
    ("SubCategories", "SubCategories"),
    ("Stations", "Stations"),
    ("Companies", "Companies"),
    ("Standards", "Standards"),
    ("Units", "Units"),
];

/// The resolved schema for one category: exactly one target table and one
/// (possibly empty) field dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySchema {
    pub target_table: String,
    /// External field -> target column. Empty for reference kind.
    pub mapping: BTreeMap<String, String>,
}

impl CategorySchema {
    /// Whether the mapping is produced at approval time instead.
    pub fn is_introspected(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Immutable category registry, built once at process start and shared via
/// `web::Data`.
#[derive(Debug)]
pub struct CategoryCatalog {
    entries: HashMap<(CategoryKind, String), CategorySchema>,
}

impl CategoryCatalog {
    pub fn new() -> Self {
        let mut entries = HashMap::new();

        for (id, table, fields) in MONITORING {
            entries.insert(
                (CategoryKind::Monitoring, (*id).to_string()),
                dictionary_schema(table, fields),
            );
        }

        for (id, table, fields) in ENHANCEMENT {
            entries.insert(
                (CategoryKind::Enhancement, (*id).to_string()),
                dictionary_schema(table, fields),
            );
        }

        for (id, table) in REFERENCE {
            entries.insert(
                (CategoryKind::Reference, (*id).to_string()),
                CategorySchema {
                    target_table: (*table).to_string(),
                    mapping: BTreeMap::new(),
                },
            );
        }

        Self { entries }
    }

    /// Look up the schema for a category. `None` means the category is
    /// unknown to this catalog revision.
    pub fn resolve(&self, kind: CategoryKind, category_id: &str) -> Option<&CategorySchema> {
        self.entries.get(&(kind, category_id.to_string()))
    }

    pub fn version(&self) -> &'static str {
        CATALOG_VERSION
    }

    /// Category identifiers known for a kind, for error messages.
    pub fn known_ids(&self, kind: CategoryKind) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn dictionary_schema(table: &str, fields: &[(&str, &str)]) -> CategorySchema {
    let mut mapping = BTreeMap::new();
    for (field, column) in COMMON_FIELDS.iter().chain(fields.iter()) {
        mapping.insert((*field).to_string(), (*column).to_string());
    }
    CategorySchema {
        target_table: table.to_string(),
        mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_cardinality() {
        let catalog = CategoryCatalog::new();
        assert_eq!(catalog.known_ids(CategoryKind::Monitoring).len(), 15);
        assert_eq!(catalog.known_ids(CategoryKind::Enhancement).len(), 10);
        assert_eq!(catalog.known_ids(CategoryKind::Reference).len(), 8);
    }

    #[test]
    fn test_so2_resolves_to_wind_table() {
        let catalog = CategoryCatalog::new();
        let schema = catalog.resolve(CategoryKind::Monitoring, "SO2").unwrap();

        assert_eq!(schema.target_table, "Env_Wind_SO2");
        assert_eq!(
            schema.mapping.get("day1st_result_ppm").map(String::as_str),
            Some("day1st_result_ppm")
        );
        // Fields outside the dictionary are not mapped.
        assert!(!schema.mapping.contains_key("indexName"));
    }

    #[test]
    fn test_relational_columns_present_everywhere() {
        let catalog = CategoryCatalog::new();
        for kind in [CategoryKind::Monitoring, CategoryKind::Enhancement] {
            for id in catalog.known_ids(kind) {
                let schema = catalog.resolve(kind, id).unwrap();
                assert_eq!(
                    schema.mapping.get("station_id").map(String::as_str),
                    Some("station_id"),
                    "{id} is missing station_id"
                );
                assert_eq!(
                    schema.mapping.get("reportBy").map(String::as_str),
                    Some("report_by"),
                    "{id} is missing reportBy"
                );
            }
        }
    }

    #[test]
    fn test_reference_schemas_are_introspected() {
        let catalog = CategoryCatalog::new();
        let schema = catalog.resolve(CategoryKind::Reference, "Years").unwrap();
        assert_eq!(schema.target_table, "Years");
        assert!(schema.is_introspected());
    }

    #[test]
    fn test_unknown_category_misses() {
        let catalog = CategoryCatalog::new();
        assert!(catalog.resolve(CategoryKind::Monitoring, "NOx").is_none());
        // Kind matters: SO2 is not a reference table.
        assert!(catalog.resolve(CategoryKind::Reference, "SO2").is_none());
    }

    #[test]
    fn test_target_tables_are_unique() {
        let catalog = CategoryCatalog::new();
        let mut seen = std::collections::HashSet::new();
        for (_, schema) in catalog.entries.iter() {
            assert!(
                seen.insert(schema.target_table.clone()),
                "duplicate target table {}",
                schema.target_table
            );
        }
    }
}
