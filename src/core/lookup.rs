//! Static category tables and the resolver that reads them.
//!
//! Every table is a slice of [`CategoryCoefficient`] rows. Unknown keys never
//! fail: the caller supplies the row to fall back to, normally
//! [`CategoryCoefficient::neutral`] for multipliers.

use tracing::debug;

use super::types::CategoryCoefficient;

type Row = CategoryCoefficient;

pub fn find<'a>(table: &'a [Row], key: &str) -> Option<&'a Row> {
    table.iter().find(|row| row.key == key)
}

pub fn resolve<'a>(table: &'a [Row], key: &str, fallback: &'a Row) -> &'a Row {
    match find(table, key) {
        Some(row) => row,
        None => {
            debug!(key, fallback = fallback.key, "unknown category key, using fallback");
            fallback
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Terrain {
    Paved,
    DirtRoad,
    LightBrush,
    HardSnow,
    HeavyBrush,
    Swamp,
    LooseSand,
}

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Paved,
        Terrain::DirtRoad,
        Terrain::LightBrush,
        Terrain::HardSnow,
        Terrain::HeavyBrush,
        Terrain::Swamp,
        Terrain::LooseSand,
    ];

    /// Unrecognised keys map to paved ground, the neutral 1.0 coefficient.
    pub fn from_key(key: &str) -> Terrain {
        match key {
            "paved" => Terrain::Paved,
            "dirt-road" => Terrain::DirtRoad,
            "light-brush" => Terrain::LightBrush,
            "hard-snow" => Terrain::HardSnow,
            "heavy-brush" => Terrain::HeavyBrush,
            "swamp" => Terrain::Swamp,
            "loose-sand" => Terrain::LooseSand,
            other => {
                debug!(key = other, "unknown terrain, using paved");
                Terrain::Paved
            }
        }
    }

    pub fn row(self) -> &'static Row {
        let index = match self {
            Terrain::Paved => 0,
            Terrain::DirtRoad => 1,
            Terrain::LightBrush => 2,
            Terrain::HardSnow => 3,
            Terrain::HeavyBrush => 4,
            Terrain::Swamp => 5,
            Terrain::LooseSand => 6,
        };
        &TERRAINS[index]
    }

    pub fn coefficient(self) -> f64 {
        self.row().coefficient
    }
}

/// Pandolf terrain factors (η).
pub const TERRAINS: &[Row] = &[
    Row::new("paved", 1.0, "Paved / treadmill", "Blacktop, sidewalk or treadmill"),
    Row::new("dirt-road", 1.1, "Dirt road", "Packed dirt or gravel road"),
    Row::new("light-brush", 1.2, "Light brush", "Trail with light undergrowth"),
    Row::new("hard-snow", 1.3, "Hard-packed snow", "Firm, packed snow"),
    Row::new("heavy-brush", 1.5, "Heavy brush", "Off-trail through dense growth"),
    Row::new("swamp", 1.8, "Swampy bog", "Wet, sucking ground"),
    Row::new("loose-sand", 2.1, "Loose sand", "Beach or dune sand"),
];

pub const LENS_INDICES: &[Row] = &[
    Row::new("1.50", 1.50, "CR-39 plastic", "Standard plastic, thickest option"),
    Row::new("1.53", 1.53, "Trivex", "Light and impact resistant"),
    Row::new("1.59", 1.59, "Polycarbonate", "Impact resistant, common for kids"),
    Row::new("1.60", 1.60, "High-index 1.60", "Thinner for moderate prescriptions"),
    Row::new("1.67", 1.67, "High-index 1.67", "Thin for strong prescriptions"),
    Row::new("1.74", 1.74, "High-index 1.74", "Thinnest available plastic"),
];

/// Installed price per linear foot, midpoint of the typical range.
pub const FENCE_MATERIALS: &[Row] = &[
    Row::new("chain-link", 15.0, "Chain link", "$10-$20 per linear foot"),
    Row::new("wood-privacy", 25.0, "Wood privacy", "$15-$35 per linear foot"),
    Row::new("split-rail", 16.0, "Split rail", "$12-$20 per linear foot"),
    Row::new("vinyl", 30.0, "Vinyl", "$20-$40 per linear foot"),
    Row::new("aluminum", 35.0, "Aluminum", "$25-$45 per linear foot"),
    Row::new("composite", 37.5, "Composite", "$25-$50 per linear foot"),
    Row::new("wrought-iron", 40.0, "Wrought iron", "$30-$50 per linear foot"),
];

pub fn default_fence_material() -> &'static Row {
    &FENCE_MATERIALS[1]
}

/// Base removal cost by tree height, midpoint of the typical range.
pub const TREE_HEIGHT_CLASSES: &[Row] = &[
    Row::new("small", 325.0, "Small (under 30 ft)", "$200-$450"),
    Row::new("medium", 675.0, "Medium (30-60 ft)", "$450-$900"),
    Row::new("large", 1_200.0, "Large (60-80 ft)", "$900-$1,500"),
    Row::new("very-large", 1_850.0, "Very large (over 80 ft)", "$1,500-$2,200"),
];

pub fn tree_height_class(height_ft: f64) -> &'static Row {
    let index = if height_ft < 30.0 {
        0
    } else if height_ft <= 60.0 {
        1
    } else if height_ft <= 80.0 {
        2
    } else {
        3
    };
    &TREE_HEIGHT_CLASSES[index]
}

pub const TREE_CONDITIONS: &[Row] = &[
    Row::new("healthy", 1.0, "Healthy", "Standard felling"),
    Row::new("dead", 1.25, "Dead or dying", "Brittle wood needs careful rigging"),
    Row::new("storm-damaged", 1.4, "Storm damaged", "Split limbs under tension"),
    Row::new("leaning", 1.3, "Leaning", "Directional felling required"),
    Row::new("near-structure", 1.5, "Near a structure", "Sectional removal with rigging"),
];

/// State-level base sales tax rates in percent, excluding local add-ons.
pub const STATE_SALES_TAX: &[Row] = &[
    Row::new("AL", 4.0, "Alabama", ""),
    Row::new("AK", 0.0, "Alaska", "No state sales tax"),
    Row::new("AZ", 5.6, "Arizona", ""),
    Row::new("AR", 6.5, "Arkansas", ""),
    Row::new("CA", 7.25, "California", ""),
    Row::new("CO", 2.9, "Colorado", ""),
    Row::new("CT", 6.35, "Connecticut", ""),
    Row::new("DE", 0.0, "Delaware", "No state sales tax"),
    Row::new("DC", 6.0, "District of Columbia", ""),
    Row::new("FL", 6.0, "Florida", ""),
    Row::new("GA", 4.0, "Georgia", ""),
    Row::new("HI", 4.0, "Hawaii", "General excise tax"),
    Row::new("ID", 6.0, "Idaho", ""),
    Row::new("IL", 6.25, "Illinois", ""),
    Row::new("IN", 7.0, "Indiana", ""),
    Row::new("IA", 6.0, "Iowa", ""),
    Row::new("KS", 6.5, "Kansas", ""),
    Row::new("KY", 6.0, "Kentucky", ""),
    Row::new("LA", 4.45, "Louisiana", ""),
    Row::new("ME", 5.5, "Maine", ""),
    Row::new("MD", 6.0, "Maryland", ""),
    Row::new("MA", 6.25, "Massachusetts", ""),
    Row::new("MI", 6.0, "Michigan", ""),
    Row::new("MN", 6.875, "Minnesota", ""),
    Row::new("MS", 7.0, "Mississippi", ""),
    Row::new("MO", 4.225, "Missouri", ""),
    Row::new("MT", 0.0, "Montana", "No state sales tax"),
    Row::new("NE", 5.5, "Nebraska", ""),
    Row::new("NV", 6.85, "Nevada", ""),
    Row::new("NH", 0.0, "New Hampshire", "No state sales tax"),
    Row::new("NJ", 6.625, "New Jersey", ""),
    Row::new("NM", 4.875, "New Mexico", "Gross receipts tax"),
    Row::new("NY", 4.0, "New York", ""),
    Row::new("NC", 4.75, "North Carolina", ""),
    Row::new("ND", 5.0, "North Dakota", ""),
    Row::new("OH", 5.75, "Ohio", ""),
    Row::new("OK", 4.5, "Oklahoma", ""),
    Row::new("OR", 0.0, "Oregon", "No state sales tax"),
    Row::new("PA", 6.0, "Pennsylvania", ""),
    Row::new("RI", 7.0, "Rhode Island", ""),
    Row::new("SC", 6.0, "South Carolina", ""),
    Row::new("SD", 4.2, "South Dakota", ""),
    Row::new("TN", 7.0, "Tennessee", ""),
    Row::new("TX", 6.25, "Texas", ""),
    Row::new("UT", 6.1, "Utah", "Includes mandatory local rate"),
    Row::new("VT", 6.0, "Vermont", ""),
    Row::new("VA", 5.3, "Virginia", ""),
    Row::new("WA", 6.5, "Washington", ""),
    Row::new("WV", 6.0, "West Virginia", ""),
    Row::new("WI", 5.0, "Wisconsin", ""),
    Row::new("WY", 4.0, "Wyoming", ""),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_returns_exact_match() {
        let fallback = CategoryCoefficient::neutral();
        let row = resolve(TERRAINS, "swamp", &fallback);
        assert_eq!(row.coefficient, 1.8);
    }

    #[test]
    fn resolve_falls_back_to_caller_default() {
        let fallback = CategoryCoefficient::neutral();
        let row = resolve(TERRAINS, "lava", &fallback);
        assert_eq!(row.key, "neutral");
        assert_eq!(row.coefficient, 1.0);

        let material = resolve(FENCE_MATERIALS, "bamboo", default_fence_material());
        assert_eq!(material.key, "wood-privacy");
    }

    #[test]
    fn key_match_is_exact() {
        assert!(find(LENS_INDICES, "1.5").is_none());
        assert!(find(LENS_INDICES, "1.50").is_some());
        assert!(find(TERRAINS, "Paved").is_none());
    }

    #[test]
    fn terrain_enum_matches_table_rows() {
        for terrain in Terrain::ALL {
            let row = terrain.row();
            assert_eq!(Terrain::from_key(row.key), terrain);
        }
        assert_eq!(Terrain::from_key("moon-dust"), Terrain::Paved);
        assert_eq!(Terrain::from_key("moon-dust").coefficient(), 1.0);
    }

    #[test]
    fn tables_have_unique_keys() {
        for table in [
            TERRAINS,
            LENS_INDICES,
            FENCE_MATERIALS,
            TREE_HEIGHT_CLASSES,
            TREE_CONDITIONS,
            STATE_SALES_TAX,
        ] {
            for (i, row) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|other| other.key != row.key),
                    "duplicate key {}",
                    row.key
                );
            }
        }
    }

    #[test]
    fn tree_height_class_boundaries() {
        assert_eq!(tree_height_class(29.9).key, "small");
        assert_eq!(tree_height_class(30.0).key, "medium");
        assert_eq!(tree_height_class(60.0).key, "medium");
        assert_eq!(tree_height_class(80.0).key, "large");
        assert_eq!(tree_height_class(95.0).key, "very-large");
    }

    #[test]
    fn state_table_covers_fifty_states_and_dc() {
        assert_eq!(STATE_SALES_TAX.len(), 51);
        assert_eq!(find(STATE_SALES_TAX, "CA").map(|r| r.coefficient), Some(7.25));
    }
}
