//! Evidence categories and their colors.
//!
//! Category resolution is a priority chain over label substrings: the first
//! category with a matching keyword wins. A label matching both a weapon
//! keyword and nothing else specific always resolves to the weapon.

use image::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    Biohazard,
    Firearm,
    Blade,
    Person,
    Digital,
    General,
}

/// Resolution order. `General` is the fallback and has no keywords.
const PRIORITY: [(EvidenceCategory, &[&str]); 5] = [
    (EvidenceCategory::Biohazard, &["blood"]),
    (EvidenceCategory::Firearm, &["gun"]),
    (EvidenceCategory::Blade, &["knife"]),
    (EvidenceCategory::Person, &["person"]),
    (EvidenceCategory::Digital, &["phone", "laptop"]),
];

impl EvidenceCategory {
    /// Resolve a unified label (case-insensitive substring match).
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        PRIORITY
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(cat, _)| *cat)
            .unwrap_or(Self::General)
    }

    pub fn is_weapon(self) -> bool {
        matches!(self, Self::Firearm | Self::Blade)
    }

    /// Box color on the annotated raster.
    pub fn raster_color(self) -> Rgb<u8> {
        match self {
            Self::Biohazard => Rgb([0, 0, 139]),
            Self::Firearm => Rgb([255, 0, 0]),
            Self::Blade => Rgb([255, 69, 0]),
            Self::Person => Rgb([255, 255, 0]),
            Self::Digital => Rgb([0, 0, 255]),
            Self::General => Rgb([0, 255, 255]),
        }
    }

    /// Marker color in the 3D scene.
    pub fn scene_color(self) -> &'static str {
        match self {
            Self::Biohazard => "#1e3a8a",
            Self::Firearm => "#ef4444",
            Self::Blade => "#f97316",
            Self::Person => "#fbbf24",
            Self::Digital => "#3b82f6",
            Self::General => "#22d3ee",
        }
    }
}

pub(crate) const LABEL_BACKGROUND: Rgb<u8> = Rgb([50, 50, 50]);
pub(crate) const LABEL_TEXT: Rgb<u8> = Rgb([255, 255, 255]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_chain_first_match_wins() {
        assert_eq!(EvidenceCategory::classify("Blood Stain"), EvidenceCategory::Biohazard);
        assert_eq!(EvidenceCategory::classify("Gun"), EvidenceCategory::Firearm);
        assert_eq!(EvidenceCategory::classify("Knife"), EvidenceCategory::Blade);
        assert_eq!(EvidenceCategory::classify("Person"), EvidenceCategory::Person);
        assert_eq!(EvidenceCategory::classify("Cell Phone"), EvidenceCategory::Digital);
        assert_eq!(EvidenceCategory::classify("Laptop"), EvidenceCategory::Digital);
        assert_eq!(EvidenceCategory::classify("Cup"), EvidenceCategory::General);
    }

    #[test]
    fn overlapping_keywords_resolve_by_priority() {
        // Matches both blade and person keywords.
        assert_eq!(
            EvidenceCategory::classify("Person holding Knife"),
            EvidenceCategory::Blade
        );
        assert_eq!(
            EvidenceCategory::classify("Blood on Gun"),
            EvidenceCategory::Biohazard
        );
        assert!(EvidenceCategory::classify("Knife").is_weapon());
        assert!(!EvidenceCategory::classify("Backpack").is_weapon());
    }
}
