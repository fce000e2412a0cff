//! User catalog files — optional YAML overlay from ~/.linesmith/catalog.yaml.
//!
//! Every section is optional; loaded entries append to the built-in catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Catalog, Lick, RichRule, Riff, Rule, Scale};
use crate::timeline::Progression;

/// Intermediate YAML representation — all sections optional.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub rich_rules: Vec<RichRule>,
    #[serde(default)]
    pub riffs: Vec<Riff>,
    #[serde(default)]
    pub progressions: Vec<Progression>,
    #[serde(default)]
    pub scales: Vec<Scale>,
    #[serde(default)]
    pub licks: Vec<Lick>,
}

/// Get the user catalog file path.
fn user_catalog_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".linesmith").join("catalog.yaml"))
}

/// Parse a catalog file from a YAML string.
pub fn parse(content: &str) -> Result<CatalogFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Load a catalog file from disk. Returns `None` if the file is missing or
/// unparsable.
pub fn load_from_path(path: &Path) -> Option<CatalogFile> {
    let content = std::fs::read_to_string(path).ok()?;
    parse(&content).ok()
}

/// Load the user catalog from ~/.linesmith/catalog.yaml, if present.
pub fn load_user_catalog() -> Option<CatalogFile> {
    load_from_path(&user_catalog_path()?)
}

/// Append the entries of a catalog file onto an existing catalog.
pub fn merge(catalog: &mut Catalog, extra: CatalogFile) {
    catalog.rules.extend(extra.rules);
    catalog.rich_rules.extend(extra.rich_rules);
    catalog.riffs.extend(extra.riffs);
    catalog.progressions.extend(extra.progressions);
    catalog.scales.extend(extra.scales);
    catalog.licks.extend(extra.licks);
}

/// The built-in catalog with the user catalog (if any) merged in.
pub fn load() -> Catalog {
    let mut catalog = super::builtin::catalog();
    if let Some(user) = load_user_catalog() {
        merge(&mut catalog, user);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Part, Role, Trigger};

    #[test]
    fn empty_file_parses() {
        let file = parse("{}").unwrap();
        assert!(file.rules.is_empty());
        assert!(file.progressions.is_empty());
    }

    #[test]
    fn partial_file_parses() {
        let yaml = r#"
rules:
  - id: bass-folk-anchor
    part: bass
    genre_tags: [folk]
    role: anchor
    affects_slot: targetTone
    trigger: beat1
    action: play root of current chord
progressions:
  - id: folk-I-IV
    key: G
    genre_tags: [folk]
    chords:
      - { degree: I, bars: 2 }
      - { degree: IV, bars: 2 }
"#;
        let file = parse(yaml).unwrap();
        assert_eq!(file.rules.len(), 1);
        assert_eq!(file.rules[0].part, Part::Bass);
        assert_eq!(file.rules[0].role, Role::Anchor);
        assert_eq!(file.rules[0].trigger, Trigger::Beat1);
        assert_eq!(file.rules[0].min_level, 1);
        assert_eq!(file.progressions.len(), 1);
        assert_eq!(file.progressions[0].total_bars(), 4);
    }

    #[test]
    fn merge_appends_to_builtins() {
        let mut catalog = crate::catalog::builtin::catalog();
        let builtin_rules = catalog.rules.len();
        let file = parse("rules:\n  - id: extra\n    part: lead\n    role: preference\n    affects_slot: targetTone\n    trigger: always\n    action: prefer chord tones\n").unwrap();
        merge(&mut catalog, file);
        assert_eq!(catalog.rules.len(), builtin_rules + 1);
        assert!(catalog.rules.iter().any(|r| r.id == "extra"));
    }

    #[test]
    fn missing_file_returns_none() {
        assert!(load_from_path(Path::new("/nonexistent/catalog.yaml")).is_none());
    }
}
