/// Production checklist board
///
/// Holds one project's checklist as shown to the user. An empty checklist
/// is seeded with the default taxonomy on first load; every create goes out
/// at once and the server's idempotent create keeps concurrent seeders from
/// duplicating rows. Toggle, add and remove update the board first and roll
/// back if the server refuses.

use crate::api::PlannerApi;
use crate::error::{ClientError, ClientResult};
use crate::optimistic::apply_optimistic;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use studioplan_shared::checklist::{default_items, CATEGORIES};
use studioplan_shared::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, CreateChecklistItem,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Items of one category in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Whole percent, 0 for an empty board
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

pub struct ChecklistBoard {
    api: Arc<dyn PlannerApi>,
    project_id: Uuid,
    items: Vec<ChecklistItem>,
}

impl ChecklistBoard {
    pub fn new(api: Arc<dyn PlannerApi>, project_id: Uuid) -> Self {
        Self {
            api,
            project_id,
            items: Vec::new(),
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Fetches the checklist, seeding the defaults when it is empty
    pub async fn load(&mut self) -> ClientResult<()> {
        let mut items = self.api.list_checklist(self.project_id).await?;

        if items.is_empty() {
            self.seed_defaults().await;
            items = self.api.list_checklist(self.project_id).await?;
        }

        self.items = dedupe(items);
        Ok(())
    }

    async fn seed_defaults(&self) {
        let defaults = default_items();
        let total = defaults.len();

        let results = join_all(
            defaults
                .into_iter()
                .map(|item| self.api.create_checklist_item(self.project_id, item)),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(
                project_id = %self.project_id,
                failed,
                total,
                "Some default checklist items were not created"
            );
        } else {
            debug!(project_id = %self.project_id, total, "Seeded default checklist");
        }
    }

    /// Flips one item's completion
    pub async fn toggle(&mut self, item_id: Uuid) -> ClientResult<ChecklistItem> {
        let completed = !self.item(item_id)?.completed;
        let api = self.api.clone();
        let project_id = self.project_id;

        let saved = apply_optimistic(
            &mut self.items,
            |items| {
                if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
                    item.completed = completed;
                }
            },
            || async move {
                api.update_checklist_item(project_id, item_id, ChecklistItemPatch::toggle(completed))
                    .await
            },
        )
        .await?;

        self.replace(item_id, saved.clone());
        Ok(saved)
    }

    /// Adds a custom item to `category`
    ///
    /// A placeholder row is shown until the server answers. When an item
    /// with the same text already existed the server returns it and the
    /// placeholder collapses into it.
    pub async fn add(&mut self, text: &str, category: &str) -> ClientResult<ChecklistItem> {
        let text = text.trim().to_string();
        let category = category.trim().to_string();
        if text.is_empty() || category.is_empty() {
            return Err(ClientError::Invalid(
                "Item text and category are required".into(),
            ));
        }

        let placeholder_id = Uuid::new_v4();
        let placeholder = ChecklistItem {
            id: placeholder_id,
            user_id: Uuid::nil(),
            video_project_id: self.project_id,
            text: text.clone(),
            category: category.clone(),
            completed: false,
            display_order: self.next_order(&category),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let api = self.api.clone();
        let project_id = self.project_id;
        let request = CreateChecklistItem {
            text,
            category,
            completed: None,
            display_order: None,
        };

        let saved = apply_optimistic(
            &mut self.items,
            |items| items.push(placeholder),
            || async move { api.create_checklist_item(project_id, request).await },
        )
        .await?;

        self.items.retain(|i| i.id != placeholder_id);
        match self.items.iter_mut().find(|i| i.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => self.items.push(saved.clone()),
        }
        Ok(saved)
    }

    pub async fn remove(&mut self, item_id: Uuid) -> ClientResult<()> {
        self.item(item_id)?;
        let api = self.api.clone();
        let project_id = self.project_id;

        apply_optimistic(
            &mut self.items,
            |items| items.retain(|i| i.id != item_id),
            || async move { api.delete_checklist_item(project_id, item_id).await },
        )
        .await
    }

    /// Taxonomy categories first, then freeform ones in order of appearance
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        let mut order: Vec<&str> = CATEGORIES.to_vec();
        for item in &self.items {
            if !order.contains(&item.category.as_str()) {
                order.push(&item.category);
            }
        }

        order
            .into_iter()
            .filter_map(|category| {
                let mut items: Vec<ChecklistItem> = self
                    .items
                    .iter()
                    .filter(|i| i.category == category)
                    .cloned()
                    .collect();
                if items.is_empty() {
                    return None;
                }
                items.sort_by_key(|i| i.display_order);
                Some(CategoryGroup {
                    category: category.to_string(),
                    items,
                })
            })
            .collect()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.items.iter().filter(|i| i.completed).count(),
            total: self.items.len(),
        }
    }

    fn item(&self, item_id: Uuid) -> ClientResult<&ChecklistItem> {
        self.items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ClientError::NotLoaded(format!("Checklist item {}", item_id)))
    }

    fn replace(&mut self, item_id: Uuid, saved: ChecklistItem) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            *item = saved;
        }
    }

    fn next_order(&self, category: &str) -> i32 {
        self.items
            .iter()
            .filter(|i| i.category == category)
            .map(|i| i.display_order + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Keeps the first item for each (text, category)
fn dedupe(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert((item.text.clone(), item.category.clone())))
        .collect()
}
