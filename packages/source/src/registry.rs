//! Source registry: definitions embedded from `packages/source/sources/`.
//!
//! Each `.toml` file is baked into the binary with [`include_str!`]. The
//! first entry is the default dataset used when no `--config` is given.

use crate::source_def::{SourceDefinition, parse_source_toml};

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[("sa_crime", include_str!("../sources/sa_crime.toml"))];

/// Returns every embedded source definition.
///
/// # Panics
///
/// Panics if an embedded TOML config is malformed.
#[must_use]
pub fn all_definitions() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the default embedded definition.
///
/// # Panics
///
/// Panics if the embedded default config is malformed.
#[must_use]
pub fn default_definition() -> SourceDefinition {
    let (name, toml) = SOURCE_TOMLS[0];
    parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
}

#[cfg(test)]
mod tests {
    use crime_panel_source_models::CanonicalColumn;

    use super::*;

    #[test]
    fn loads_all_definitions() {
        let defs = all_definitions();
        assert_eq!(defs.len(), SOURCE_TOMLS.len());
        for def in &defs {
            assert!(def.validate().is_ok(), "{} failed validation", def.id);
        }
    }

    #[test]
    fn default_is_south_australia() {
        let def = default_definition();
        assert_eq!(def.id, "sa_crime");
        assert_eq!(def.tables.len(), 3);
        assert_eq!(def.tables[0].period, "2022-23");
        assert_eq!(def.tables[2].period, "2024-25");
        assert_eq!(def.panel.lag_depth, 12);
        assert_eq!(def.panel.stats_window, 3);
    }

    #[test]
    fn default_mapping_targets_canonical_columns() {
        let def = default_definition();
        assert_eq!(
            def.columns.rename("Suburb - Incident"),
            CanonicalColumn::Suburb.as_ref()
        );
        assert_eq!(
            def.columns.rename("Offence count"),
            CanonicalColumn::OffenceCount.as_ref()
        );
        assert_eq!(
            def.columns.rename("Offence Level 2 Description"),
            CanonicalColumn::OffenceLevel2.as_ref()
        );
    }
}
