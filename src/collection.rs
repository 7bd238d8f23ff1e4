//! Whole-collection drafts for list-shaped content (plans, testimonials,
//! stats, contact methods).
//!
//! Item edits only touch the binding's draft array. Committing writes the
//! whole array back as a single update, so two editors of different items in
//! the same collection race and the last commit wins.

use std::fmt::Debug;

use uuid::Uuid;

use crate::binding::{Binding, ContentKind, PlanKind, TestimonialKind};
use crate::content_model::{ContactMethodData, PlanData, StatData, TestimonialData};
use crate::error::BindingError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

pub trait CollectionItem: Clone + PartialEq + Debug {
    fn item_id(&self) -> &str;

    /// A fresh item with a new id, as added by the "add" affordance.
    fn new_item() -> Self;
}

fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

impl CollectionItem for PlanData {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn new_item() -> Self {
        PlanData {
            id: new_item_id(),
            name: "New plan".to_string(),
            price: 0.0,
            description: "Plan description".to_string(),
            features: vec!["Feature 1".to_string(), "Feature 2".to_string()],
            is_popular: None,
            is_visible: Some(true),
            button_text: "Subscribe".to_string(),
            icon: None,
        }
    }
}

impl CollectionItem for TestimonialData {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn new_item() -> Self {
        TestimonialData {
            id: new_item_id(),
            name: "New client".to_string(),
            content: "Testimonial text".to_string(),
            rating: MAX_RATING,
            ..TestimonialData::default()
        }
    }
}

impl CollectionItem for StatData {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn new_item() -> Self {
        StatData {
            id: new_item_id(),
            number: 0.0,
            label: "New statistic".to_string(),
            description: None,
            suffix: None,
        }
    }
}

impl CollectionItem for ContactMethodData {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn new_item() -> Self {
        ContactMethodData {
            id: new_item_id(),
            icon: "Phone".to_string(),
            title: "New contact".to_string(),
            ..ContactMethodData::default()
        }
    }
}

impl<K, T> Binding<K>
where
    K: ContentKind<Value = Vec<T>>,
    T: CollectionItem,
{
    /// Appends a fresh item to the draft and returns its id.
    pub fn add_item(&mut self) -> Result<String, BindingError> {
        let item = T::new_item();
        let id = item.item_id().to_string();
        self.draft_mut()?.push(item);
        Ok(id)
    }

    pub fn push_item(&mut self, item: T) -> Result<(), BindingError> {
        self.draft_mut()?.push(item);
        Ok(())
    }

    pub fn item(&self, item_id: &str) -> Option<&T> {
        self.draft()?.iter().find(|item| item.item_id() == item_id)
    }

    pub fn update_item<F: FnOnce(&mut T)>(&mut self, item_id: &str, update: F) -> Result<(), BindingError> {
        let item = self
            .draft_mut()?
            .iter_mut()
            .find(|item| item.item_id() == item_id)
            .ok_or_else(|| BindingError::ItemNotFound(item_id.to_string()))?;
        update(item);
        Ok(())
    }

    /// Replaces the draft item that has the same id as `item`.
    pub fn replace_item(&mut self, item: T) -> Result<(), BindingError> {
        let item_id = item.item_id().to_string();
        self.update_item(&item_id, |slot| *slot = item)
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<T, BindingError> {
        let draft = self.draft_mut()?;
        let index = draft
            .iter()
            .position(|item| item.item_id() == item_id)
            .ok_or_else(|| BindingError::ItemNotFound(item_id.to_string()))?;
        Ok(draft.remove(index))
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), BindingError> {
        let draft = self.draft_mut()?;
        let len = draft.len();
        if from >= len {
            return Err(BindingError::IndexOutOfRange(from));
        }
        if to >= len {
            return Err(BindingError::IndexOutOfRange(to));
        }
        let item = draft.remove(from);
        draft.insert(to, item);
        Ok(())
    }
}

impl Binding<PlanKind> {
    /// Hidden plans stay in the collection but are left out of the visitor view.
    pub fn set_plan_visible(&mut self, plan_id: &str, visible: bool) -> Result<(), BindingError> {
        self.update_item(plan_id, |plan| plan.is_visible = Some(visible))
    }

    pub fn add_feature(&mut self, plan_id: &str, feature: impl Into<String>) -> Result<(), BindingError> {
        let feature = feature.into();
        self.update_item(plan_id, |plan| plan.features.push(feature))
    }

    pub fn update_feature(
        &mut self,
        plan_id: &str,
        index: usize,
        feature: impl Into<String>,
    ) -> Result<(), BindingError> {
        let feature = feature.into();
        let mut in_range = false;
        self.update_item(plan_id, |plan| {
            if let Some(slot) = plan.features.get_mut(index) {
                *slot = feature;
                in_range = true;
            }
        })?;
        if in_range {
            Ok(())
        } else {
            Err(BindingError::IndexOutOfRange(index))
        }
    }

    pub fn remove_feature(&mut self, plan_id: &str, index: usize) -> Result<String, BindingError> {
        let mut removed = None;
        self.update_item(plan_id, |plan| {
            if index < plan.features.len() {
                removed = Some(plan.features.remove(index));
            }
        })?;
        removed.ok_or(BindingError::IndexOutOfRange(index))
    }
}

impl Binding<TestimonialKind> {
    /// Sets the star rating, clamped to 1..=5.
    pub fn set_rating(&mut self, testimonial_id: &str, rating: u8) -> Result<(), BindingError> {
        let rating = rating.clamp(MIN_RATING, MAX_RATING);
        self.update_item(testimonial_id, |testimonial| testimonial.rating = rating)
    }
}
