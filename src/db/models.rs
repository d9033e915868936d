use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A net-worth observation as stored, before sanitization.
///
/// Amount columns are kept as text so that whatever the spreadsheet export or
/// a hand edit put there survives until validation decides what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub date: String,
    pub total_assets: Option<String>,
    pub net_flow: Option<String>,
    pub note: Option<String>,
}

/// A clean net-worth observation.
///
/// `total_assets` is the mark-to-market value on `date`, including any cash
/// moved that same day. `net_flow` is positive for deposits and negative for
/// withdrawals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub total_assets: f64,
    pub net_flow: f64,
    pub note: Option<String>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, total_assets: f64, net_flow: f64) -> Self {
        Self {
            date,
            total_assets,
            net_flow,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = (!note.trim().is_empty()).then_some(note);
        self
    }

    /// Project back to the stored shape
    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot {
            date: self.date.format("%Y-%m-%d").to_string(),
            total_assets: Some(self.total_assets.to_string()),
            net_flow: Some(self.net_flow.to_string()),
            note: self.note.clone(),
        }
    }
}
