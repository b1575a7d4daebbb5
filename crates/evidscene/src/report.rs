//! Tabular per-detection report records and the evidence summary.
//!
//! Every ledger entry becomes one record regardless of confidence; the
//! visualized and official flags carry the policy decisions. Field names
//! follow the exported column headers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::error::Result;
use crate::fusion::EvidenceLedger;
use crate::render::{is_visualized, EvidenceCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    /// `Standard_Model` or `Custom_Model`.
    #[serde(rename = "Model_Source")]
    pub source: String,
    #[serde(rename = "Evidence_Type")]
    pub label: String,
    #[serde(rename = "Confidence_Score")]
    pub confidence: f32,
    /// Two-decimal percentage, e.g. `"50.00%"`.
    #[serde(rename = "Confidence_Text")]
    pub confidence_text: String,
    #[serde(rename = "Visualized")]
    pub visualized: bool,
    #[serde(rename = "Official")]
    pub official: bool,
    /// Clamped `(x1, y1, x2, y2)`.
    #[serde(rename = "Coords")]
    pub coords: [f32; 4],
}

/// Report for one analysis run, in ledger order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceReport {
    pub records: Vec<ReportRecord>,
}

/// Aggregate over visualized records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    pub total: usize,
    /// Firearm and blade records.
    pub weapons: usize,
    pub persons: usize,
    /// `None` when nothing was visualized.
    pub mean_confidence: Option<f32>,
}

impl EvidenceReport {
    /// Build records stamped with the current time.
    pub fn from_ledger(ledger: &EvidenceLedger, policy: &PolicyConfig) -> Self {
        Self::with_timestamp(ledger, policy, Utc::now())
    }

    /// Build records with a fixed timestamp.
    pub fn with_timestamp(ledger: &EvidenceLedger, policy: &PolicyConfig, at: DateTime<Utc>) -> Self {
        let records = ledger
            .iter()
            .map(|d| ReportRecord {
                timestamp: at,
                source: d.source.report_tag().to_string(),
                label: d.label.clone(),
                confidence: d.confidence,
                confidence_text: format!("{:.2}%", f64::from(d.confidence) * 100.0),
                visualized: is_visualized(d.confidence, policy.visual_cutoff),
                official: d.confidence > policy.official_cutoff,
                coords: d.bbox.to_xyxy(),
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by descending confidence (stable for ties).
    pub fn sorted_by_confidence(&self) -> Vec<&ReportRecord> {
        let mut out: Vec<&ReportRecord> = self.records.iter().collect();
        out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        out
    }

    pub fn summary(&self) -> EvidenceSummary {
        let visible: Vec<&ReportRecord> = self.records.iter().filter(|r| r.visualized).collect();
        let total = visible.len();
        let mut weapons = 0;
        let mut persons = 0;
        for r in &visible {
            let cat = EvidenceCategory::classify(&r.label);
            if cat.is_weapon() {
                weapons += 1;
            } else if cat == EvidenceCategory::Person {
                persons += 1;
            }
        }
        let mean_confidence = (total > 0)
            .then(|| visible.iter().map(|r| r.confidence).sum::<f32>() / total as f32);
        EvidenceSummary {
            total,
            weapons,
            persons,
            mean_confidence,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}
