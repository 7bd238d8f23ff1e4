//! Audit views over the content history.
//!
//! Views work on a snapshot taken by [`AuditView::refresh`]; they do not follow
//! the store, so new records show up only after the next refresh.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;

use crate::content_model::{ContentHistory, ContentPayload, HistoryAction};
use crate::content_store::ContentStore;
use crate::error::AuditError;

/// Number of records in the recent-activity summary.
pub const SUMMARY_LEN: usize = 5;

pub const EXPORT_FILE_PREFIX: &str = "callistra-content";

#[derive(Debug, Clone, PartialEq)]
pub enum ChangePreview {
    Text { previous: String, new: String },
    Image { src: String },
    Plans { count: usize },
    Other,
}

impl ChangePreview {
    pub fn of(record: &ContentHistory) -> Self {
        match &record.new_content {
            ContentPayload::Text(new) | ContentPayload::RichText(new) => ChangePreview::Text {
                previous: record.previous_content.as_text().unwrap_or_default().to_string(),
                new: new.clone(),
            },
            ContentPayload::Image(image) => ChangePreview::Image { src: image.src.clone() },
            ContentPayload::Plans(list) => ChangePreview::Plans { count: list.plans.len() },
            _ => ChangePreview::Other,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ChangePreview::Text { previous, new } => format!("\"{previous}\" -> \"{new}\""),
            ChangePreview::Image { src } if src.is_empty() => "Image removed".to_string(),
            ChangePreview::Image { src } => format!("Image: {src}"),
            ChangePreview::Plans { count } => format!("{count} plan(s)"),
            ChangePreview::Other => "Content updated".to_string(),
        }
    }
}

/// One history record prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub record_id: String,
    pub content_id: String,
    pub display_name: String,
    pub action: HistoryAction,
    pub action_label: &'static str,
    pub relative_time: String,
    pub preview: ChangePreview,
    pub modified_by: String,
}

impl AuditEntry {
    pub fn describe(record: &ContentHistory, now: DateTime<Utc>) -> Self {
        Self {
            record_id: record.id.clone(),
            content_id: record.content_id.clone(),
            display_name: display_name(&record.content_id),
            action: record.action,
            action_label: record.action.label(),
            relative_time: format_relative(record.timestamp, now),
            preview: ChangePreview::of(record),
            modified_by: record.modified_by.clone(),
        }
    }
}

/// `"hero-title"` reads as `"hero title"`.
pub fn display_name(content_id: &str) -> String {
    content_id.replace('-', " ")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Distance from `then` to `now` in words, e.g. `"5 minutes ago"`.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    if minutes < 1 {
        return "less than a minute ago".to_string();
    }
    if minutes < 45 {
        return format!("{} ago", plural(minutes, "minute"));
    }
    if minutes < 24 * 60 {
        let hours = ((minutes + 30) / 60).max(1);
        return format!("about {} ago", plural(hours, "hour"));
    }
    let days = minutes / (24 * 60);
    if days < 30 {
        return format!("{} ago", plural(days, "day"));
    }
    if days < 365 {
        return format!("{} ago", plural(days / 30, "month"));
    }
    format!("{} ago", plural(days / 365, "year"))
}

#[derive(Debug, Clone, Default)]
pub struct AuditView {
    snapshot: Vec<ContentHistory>,
    filter: Option<String>,
}

impl AuditView {
    pub fn new(store: &ContentStore) -> Self {
        let mut view = Self::default();
        view.refresh(store);
        view
    }

    pub fn refresh(&mut self, store: &ContentStore) {
        self.snapshot = store.get_history(None).into_iter().cloned().collect();
    }

    /// Restricts [`entries`](Self::entries) to one content id; `None` shows all.
    pub fn select(&mut self, content_id: Option<&str>) {
        self.filter = content_id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn entries(&self) -> Vec<&ContentHistory> {
        self.snapshot
            .iter()
            .filter(|record| match &self.filter {
                Some(content_id) => &record.content_id == content_id,
                None => true,
            })
            .collect()
    }

    pub fn describe_entries(&self, now: DateTime<Utc>) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .map(|record| AuditEntry::describe(record, now))
            .collect()
    }

    /// Distinct content ids in the snapshot, in order of first appearance.
    pub fn content_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.snapshot
            .iter()
            .map(|record| record.content_id.as_str())
            .filter(|content_id| seen.insert(*content_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

/// The most recent records, for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    pub recent: Vec<ContentHistory>,
}

impl AuditSummary {
    pub fn from_store(store: &ContentStore) -> Self {
        Self {
            recent: store.history().iter().take(SUMMARY_LEN).cloned().collect(),
        }
    }

    pub fn lines(&self, now: DateTime<Utc>) -> Vec<String> {
        self.recent
            .iter()
            .map(|record| {
                format!(
                    "{} was {} {}",
                    display_name(&record.content_id),
                    record.action.label().to_lowercase(),
                    format_relative(record.timestamp, now)
                )
            })
            .collect()
    }
}

/// Counters shown by the debug panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugStats {
    pub editable_elements: usize,
    pub modified_content: usize,
    pub total_sections: usize,
}

impl DebugStats {
    pub fn collect(store: &ContentStore) -> Self {
        let history = store.history();
        let sections: BTreeSet<&str> = history
            .iter()
            .map(|record| record.content_id.split('-').next().unwrap_or("unknown"))
            .collect();
        Self {
            editable_elements: history.len(),
            modified_content: history
                .iter()
                .filter(|record| record.action == HistoryAction::Update)
                .count(),
            total_sections: sections.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryExport {
    pub file_name: String,
    pub body: String,
}

impl HistoryExport {
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, AuditError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.body)?;
        info!("History exported to {}", path.display());
        Ok(path)
    }
}

/// Serializes the whole history as pretty JSON named
/// `callistra-content-<YYYY-MM-DD>.json`.
pub fn export_history(store: &ContentStore, now: DateTime<Utc>) -> Result<HistoryExport, AuditError> {
    Ok(HistoryExport {
        file_name: format!("{}-{}.json", EXPORT_FILE_PREFIX, now.format("%Y-%m-%d")),
        body: serde_json::to_string_pretty(store.history())?,
    })
}

/// Re-applies the record's previous content as a new update. The revert is
/// itself recorded in the history.
pub fn revert(store: &mut ContentStore, record_id: &str) -> Result<(), AuditError> {
    let record = store
        .find_history_record(record_id)
        .cloned()
        .ok_or_else(|| AuditError::RecordNotFound(record_id.to_string()))?;
    store.update_content(&record.content_id, record.previous_content, &record.section)?;
    info!("Reverted '{}' to the value before record {}", record.content_id, record_id);
    Ok(())
}
