//! Backend-native class id to unified evidence label mapping.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Unified-label table for one backend.
///
/// Ids absent from the table are not evidence: the fusion engine drops them,
/// which lets each backend run over its full class set.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClassTable {
    entries: BTreeMap<u32, String>,
}

impl ClassTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(id, l)| (id, l.into())).collect(),
        }
    }

    /// COCO subset relevant to scene evidence (general-purpose model).
    pub fn coco_evidence() -> Self {
        Self::from_pairs([
            (0, "Person"),
            (24, "Backpack"),
            (26, "Handbag"),
            (28, "Suitcase"),
            (39, "Bottle"),
            (40, "Wine Glass"),
            (41, "Cup"),
            (43, "Knife"),
            (67, "Cell Phone"),
            (73, "Laptop"),
            (76, "Scissors"),
        ])
    }

    /// Classes of the forensic specialized model.
    pub fn forensic() -> Self {
        Self::from_pairs([(0, "Gun"), (1, "Blood Stain")])
    }

    /// Load a table from JSON (`{"0": "Person", ...}`).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let table: Self = serde_json::from_str(&data)?;
        if table.entries.values().any(|l| l.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "class table {} contains an empty label",
                path.display()
            )));
        }
        Ok(table)
    }

    pub fn label(&self, class_id: u32) -> Option<&str> {
        self.entries.get(&class_id).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries.iter().map(|(&id, l)| (id, l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_known_ids() {
        let coco = ClassTable::coco_evidence();
        assert_eq!(coco.label(43), Some("Knife"));
        assert_eq!(coco.label(1), None);
        let forensic = ClassTable::forensic();
        assert_eq!(forensic.label(1), Some("Blood Stain"));
    }

    #[test]
    fn json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"{"3": "Hammer", "7": "Rope"}"#).unwrap();
        let table = ClassTable::from_json_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.label(3), Some("Hammer"));
    }

    #[test]
    fn empty_label_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"{"3": " "}"#).unwrap();
        assert!(matches!(
            ClassTable::from_json_file(&path),
            Err(Error::InvalidConfig(_))
        ));
    }
}
