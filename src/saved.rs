//! Saved campaign links, kept in their own persisted collection.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::row::Row;
use crate::utm::build_utm_url;

/// The five UTM values captured at save time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub term: String,
    pub content: String,
}

impl UtmParams {
    pub fn from_row(row: &Row) -> Self {
        Self {
            source: row.source.clone(),
            medium: row.medium.clone(),
            campaign: row.campaign.clone(),
            term: row.term.clone(),
            content: row.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub id: String,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub params: UtmParams,
    #[serde(default)]
    pub full_url: String,
}

impl SavedItem {
    /// Snapshot a grid row. Returns `None` when the row has no usable URL.
    pub fn from_row(row: &Row, saved_at: DateTime<Utc>) -> Option<Self> {
        let full_url = build_utm_url(row);
        if full_url.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            campaign_name: format!("{}-{}-{}", row.source, row.medium, row.campaign),
            saved_at,
            comment: String::new(),
            params: UtmParams::from_row(row),
            full_url,
        })
    }

    /// Local time formatted for the saved list
    pub fn saved_at_display(&self) -> String {
        self.saved_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Ordered saved-items collection, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedItems {
    items: Vec<SavedItem>,
}

impl SavedItems {
    pub fn new(items: Vec<SavedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[SavedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SavedItem> {
        self.items.get(index)
    }

    pub fn extend(&mut self, new_items: Vec<SavedItem>) {
        self.items.extend(new_items);
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn delete_all(&mut self) {
        self.items.clear();
    }

    pub fn update_comment(&mut self, id: &str, comment: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.comment = comment.to_string();
                true
            }
            None => false,
        }
    }
}
