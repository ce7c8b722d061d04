//! Checklist generation and the stateful [`Checklist`] wrapper.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::rules::{ItemTemplate, RULES};
use super::types::{ChecklistItem, ItemSource, SiteVisit};
use crate::error::{FlowError, Result};

fn instantiate(template: &ItemTemplate, source: ItemSource) -> ChecklistItem {
    ChecklistItem {
        id: Uuid::new_v4().to_string(),
        category: template.category.to_string(),
        description: template.description.to_string(),
        checked: false,
        required: template.required,
        source,
    }
}

/// Build a fresh checklist for a site visit.
///
/// Standard items come first, then each triggered rule in declaration order.
/// Only the generated ids differ between calls with the same input.
#[must_use]
pub fn generate_checklist(visit: &SiteVisit) -> Vec<ChecklistItem> {
    let items: Vec<ChecklistItem> = RULES
        .iter()
        .filter(|rule| rule.trigger.holds(visit))
        .flat_map(|rule| {
            rule.items
                .iter()
                .map(move |template| instantiate(template, rule.source))
        })
        .collect();
    debug!(
        rooms = visit.rooms.len(),
        prompts = visit.prompt_responses.len(),
        items = items.len(),
        "generated pre-start checklist"
    );
    items
}

/// Generated checklist plus the user's ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist {
    items: Vec<ChecklistItem>,
}

impl Checklist {
    #[must_use]
    pub fn generate(visit: &SiteVisit) -> Self {
        Self {
            items: generate_checklist(visit),
        }
    }

    #[must_use]
    pub const fn from_items(items: Vec<ChecklistItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<ChecklistItem> {
        self.items
    }

    /// Drop items that are not required. Returns how many ticked items went
    /// with them.
    pub fn retain_required(&mut self) -> usize {
        let dropped_checked = self
            .items
            .iter()
            .filter(|item| item.checked && !item.required)
            .count();
        self.items.retain(|item| item.required);
        dropped_checked
    }

    /// Flip an item and return its new state.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool> {
        let item = self.find_mut(item_id)?;
        item.checked = !item.checked;
        Ok(item.checked)
    }

    pub fn set_checked(&mut self, item_id: &str, checked: bool) -> Result<()> {
        self.find_mut(item_id)?.checked = checked;
        Ok(())
    }

    fn find_mut(&mut self, item_id: &str) -> Result<&mut ChecklistItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| FlowError::ChecklistItemNotFound(item_id.to_string()))
    }

    #[must_use]
    pub fn outstanding_required(&self) -> Vec<&ChecklistItem> {
        self.items
            .iter()
            .filter(|item| item.required && !item.checked)
            .collect()
    }

    /// True once every required item is ticked.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.items.iter().all(|item| item.checked || !item.required)
    }

    /// Regenerate for an updated visit, keeping id and tick state for items
    /// that are still produced.
    ///
    /// Returns how many ticked items were dropped.
    pub fn regenerate(&mut self, visit: &SiteVisit) -> usize {
        let previous_items = std::mem::take(&mut self.items);
        let mut previous: HashMap<(String, String, ItemSource), &ChecklistItem> = previous_items
            .iter()
            .map(|item| {
                let (category, description, source) = item.key();
                ((category.to_owned(), description.to_owned(), source), item)
            })
            .collect();

        let mut kept = 0usize;
        let mut items = generate_checklist(visit);
        for item in &mut items {
            let (category, description, source) = item.key();
            let matched = previous.remove(&(category.to_owned(), description.to_owned(), source));
            if let Some(old) = matched {
                item.id = old.id.clone();
                item.checked = old.checked;
                kept += 1;
            }
        }
        let dropped_checked = previous.values().filter(|item| item.checked).count();
        debug!(kept, dropped = previous.len(), dropped_checked, "regenerated checklist");
        self.items = items;
        dropped_checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::types::{PromptResponse, RoomType};

    fn tuples(items: &[ChecklistItem]) -> Vec<(String, String, bool, ItemSource)> {
        items
            .iter()
            .map(|i| (i.category.clone(), i.description.clone(), i.required, i.source))
            .collect()
    }

    #[test]
    fn empty_visit_yields_standard_items() {
        let items = generate_checklist(&SiteVisit::default());
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|i| i.source == ItemSource::Standard && !i.checked));
        assert_eq!(items[0].category, "Safety");
        assert_eq!(items[9].category, "Documentation");
    }

    #[test]
    fn bathroom_adds_two_bonding_items() {
        let visit = SiteVisit::default().with_room(RoomType::Bathroom);
        let items = generate_checklist(&visit);
        assert_eq!(items.len(), 12);
        assert!(items[10..].iter().all(|i| i.category == "Bonding" && i.source == ItemSource::Prompt));
    }

    #[test]
    fn every_rule_can_fire_together() {
        let visit = SiteVisit::default()
            .with_room(RoomType::Bathroom)
            .with_room(RoomType::Kitchen)
            .with_room(RoomType::Garden)
            .with_room(RoomType::Garage)
            .with_room(RoomType::Loft)
            .with_prompt("occupied", PromptResponse::Flag(true))
            .with_prompt("property_age", PromptResponse::Text("pre-2000".into()))
            .with_prompt("working_at_height", PromptResponse::Text("yes".into()))
            .with_prompt("solar_pv", PromptResponse::Flag(true))
            .with_prompt("ev_charger", PromptResponse::Number(1.0));
        let total: usize = RULES.iter().map(|r| r.items.len()).sum();
        assert_eq!(generate_checklist(&visit).len(), total);
    }

    #[test]
    fn ids_are_unique_per_generation() {
        let items = generate_checklist(&SiteVisit::default().with_room(RoomType::Loft));
        let mut ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn same_input_same_tuples() {
        let visit = SiteVisit::default()
            .with_room(RoomType::Kitchen)
            .with_prompt("occupied", PromptResponse::Flag(true));
        assert_eq!(
            tuples(&generate_checklist(&visit)),
            tuples(&generate_checklist(&visit))
        );
    }

    #[test]
    fn toggle_and_readiness() {
        let mut checklist = Checklist::generate(&SiteVisit::default());
        assert!(!checklist.is_ready());
        let ids: Vec<_> = checklist
            .outstanding_required()
            .iter()
            .map(|i| i.id.clone())
            .collect();
        for id in &ids {
            assert!(checklist.toggle(id).unwrap());
        }
        assert!(checklist.is_ready());
        assert!(!checklist.toggle(&ids[0]).unwrap());
        assert!(!checklist.is_ready());
        assert!(matches!(
            checklist.toggle("missing"),
            Err(FlowError::ChecklistItemNotFound(_))
        ));
    }

    #[test]
    fn regenerate_keeps_ticks_for_surviving_items() {
        let visit = SiteVisit::default().with_room(RoomType::Bathroom);
        let mut checklist = Checklist::generate(&visit);
        let first = checklist.items()[0].id.clone();
        let bonding = checklist.items()[10].id.clone();
        checklist.set_checked(&first, true).unwrap();
        checklist.set_checked(&bonding, true).unwrap();

        let updated = SiteVisit::default().with_room(RoomType::Loft);
        assert_eq!(checklist.regenerate(&updated), 1);

        assert_eq!(checklist.items().len(), 11);
        assert_eq!(checklist.items()[0].id, first);
        assert!(checklist.items()[0].checked);
        assert!(checklist.items().iter().all(|i| i.id != bonding));
        assert!(!checklist.items()[10].checked);
    }

    #[test]
    fn items_round_trip_through_wrapper() {
        let items = generate_checklist(&SiteVisit::default().with_room(RoomType::Garden));
        let checklist = Checklist::from_items(items.clone());
        assert_eq!(checklist.outstanding_required().len(), 9);
        assert_eq!(checklist.into_items(), items);
    }

    #[test]
    fn retain_required_drops_optional_items() {
        let mut checklist = Checklist::generate(&SiteVisit::default());
        let optional = checklist.items().iter().find(|item| !item.required).unwrap().id.clone();
        let required = checklist.items()[0].id.clone();
        checklist.toggle(&optional).unwrap();
        checklist.toggle(&required).unwrap();
        assert_eq!(checklist.retain_required(), 1);
        assert_eq!(checklist.items().len(), 8);
    }

    mod props {
        use super::*;
        use crate::test_utils::arbitrary::arb_site_visit;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn generation_is_deterministic(visit in arb_site_visit()) {
                prop_assert_eq!(
                    tuples(&generate_checklist(&visit)),
                    tuples(&generate_checklist(&visit))
                );
            }

            #[test]
            fn standard_items_always_lead(visit in arb_site_visit()) {
                let items = generate_checklist(&visit);
                prop_assert!(items.len() >= RULES[0].items.len());
                prop_assert!(items[..RULES[0].items.len()]
                    .iter()
                    .all(|i| i.source == ItemSource::Standard));
            }

            #[test]
            fn regenerating_same_visit_keeps_everything(visit in arb_site_visit()) {
                let mut checklist = Checklist::generate(&visit);
                let before = checklist.clone();
                checklist.regenerate(&visit);
                prop_assert_eq!(checklist, before);
            }
        }
    }
}
