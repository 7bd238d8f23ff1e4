//! Editable bindings: one per editable page region.
//!
//! A [`Binding`] resolves the region's effective content (stored override,
//! else the default authored at the call site), reports what should be
//! rendered for the current edit mode, and runs the edit workflow:
//!
//! ```text
//! Viewing  --edit mode on-->  BrowsingEditable  --start_edit-->  Editing
//!                                   ^                               |
//!                                   +------- commit / cancel -------+
//! ```
//!
//! While editing, changes go to a binding-local draft. `commit` writes the
//! draft through [`ContentStore::update_content`] in one call; `cancel`
//! drops it without touching the store. The store is passed into each call
//! rather than held by the binding.
//!
//! The content shape is chosen by the [`ContentKind`] marker type. Kind
//! specific draft operations live in [`crate::collection`],
//! [`crate::rich_text`] and [`crate::image`].

use std::fmt::Debug;
use std::marker::PhantomData;

use log::{debug, warn};

use crate::content_model::{
    ContactMethodData, ContactMethodListContent, ContentPayload, ContentType, ImageContent, PlanData,
    PlanListContent, StatData, StatListContent, TestimonialData, TestimonialListContent,
};
use crate::content_store::ContentStore;
use crate::error::BindingError;

/// Maps a content type to the value a binding works with.
pub trait ContentKind {
    type Value: Clone + PartialEq + Debug;

    const TYPE: ContentType;

    /// The binding's value inside a stored payload, or `None` when the payload
    /// has another shape.
    fn extract(payload: &ContentPayload) -> Option<Self::Value>;

    fn wrap(value: Self::Value) -> ContentPayload;

    /// A value that renders as nothing outside edit mode.
    fn is_tombstone(_value: &Self::Value) -> bool {
        false
    }

    /// The part of the value shown to visitors.
    fn for_display(value: Self::Value) -> Self::Value {
        value
    }

    /// Turns the effective value into the initial draft.
    fn seed_draft(value: Self::Value) -> Self::Value {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichTextKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestimonialKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactMethodKind;

impl ContentKind for TextKind {
    type Value = String;
    const TYPE: ContentType = ContentType::Text;

    fn extract(payload: &ContentPayload) -> Option<String> {
        match payload {
            ContentPayload::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn wrap(value: String) -> ContentPayload {
        ContentPayload::Text(value)
    }
}

impl ContentKind for RichTextKind {
    type Value = String;
    const TYPE: ContentType = ContentType::RichText;

    fn extract(payload: &ContentPayload) -> Option<String> {
        match payload {
            ContentPayload::RichText(html) => Some(html.clone()),
            _ => None,
        }
    }

    fn wrap(value: String) -> ContentPayload {
        ContentPayload::RichText(value)
    }
}

impl ContentKind for ImageKind {
    type Value = ImageContent;
    const TYPE: ContentType = ContentType::Image;

    fn extract(payload: &ContentPayload) -> Option<ImageContent> {
        match payload {
            ContentPayload::Image(image) => Some(image.clone()),
            _ => None,
        }
    }

    fn wrap(value: ImageContent) -> ContentPayload {
        ContentPayload::Image(value)
    }

    fn is_tombstone(value: &ImageContent) -> bool {
        value.deleted
    }

    // Editing a deleted image starts from an empty, live image.
    fn seed_draft(mut value: ImageContent) -> ImageContent {
        value.deleted = false;
        value
    }
}

impl ContentKind for PlanKind {
    type Value = Vec<PlanData>;
    const TYPE: ContentType = ContentType::Plan;

    fn extract(payload: &ContentPayload) -> Option<Vec<PlanData>> {
        match payload {
            ContentPayload::Plans(list) => Some(list.plans.clone()),
            _ => None,
        }
    }

    fn wrap(plans: Vec<PlanData>) -> ContentPayload {
        ContentPayload::Plans(PlanListContent { plans })
    }

    fn for_display(plans: Vec<PlanData>) -> Vec<PlanData> {
        plans.into_iter().filter(PlanData::visible).collect()
    }
}

impl ContentKind for TestimonialKind {
    type Value = Vec<TestimonialData>;
    const TYPE: ContentType = ContentType::Testimonial;

    fn extract(payload: &ContentPayload) -> Option<Vec<TestimonialData>> {
        match payload {
            ContentPayload::Testimonials(list) => Some(list.testimonials.clone()),
            _ => None,
        }
    }

    fn wrap(testimonials: Vec<TestimonialData>) -> ContentPayload {
        ContentPayload::Testimonials(TestimonialListContent { testimonials })
    }
}

impl ContentKind for StatKind {
    type Value = Vec<StatData>;
    const TYPE: ContentType = ContentType::Stat;

    fn extract(payload: &ContentPayload) -> Option<Vec<StatData>> {
        match payload {
            ContentPayload::Stats(list) => Some(list.stats.clone()),
            _ => None,
        }
    }

    fn wrap(stats: Vec<StatData>) -> ContentPayload {
        ContentPayload::Stats(StatListContent { stats })
    }
}

impl ContentKind for ContactMethodKind {
    type Value = Vec<ContactMethodData>;
    const TYPE: ContentType = ContentType::ContactMethod;

    fn extract(payload: &ContentPayload) -> Option<Vec<ContactMethodData>> {
        match payload {
            ContentPayload::ContactMethods(list) => Some(list.contact_methods.clone()),
            _ => None,
        }
    }

    fn wrap(contact_methods: Vec<ContactMethodData>) -> ContentPayload {
        ContentPayload::ContactMethods(ContactMethodListContent { contact_methods })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Viewing,
    BrowsingEditable,
    Editing,
}

/// What a binding asks its host to render.
#[derive(Debug, Clone, PartialEq)]
pub enum View<T> {
    /// Read-only content for visitors.
    Static(T),
    /// Current content with an edit affordance.
    Editable(T),
    /// The in-progress draft.
    Editing(T),
    /// Deleted content: nothing for visitors, a placeholder in edit mode.
    Tombstone { editable: bool },
}

#[derive(Debug, Clone)]
pub struct Binding<K: ContentKind> {
    id: String,
    section: String,
    default: K::Value,
    draft: Option<K::Value>,
    kind: PhantomData<K>,
}

pub type TextBinding = Binding<TextKind>;
pub type RichTextBinding = Binding<RichTextKind>;
pub type ImageBinding = Binding<ImageKind>;
pub type PlanBinding = Binding<PlanKind>;
pub type TestimonialBinding = Binding<TestimonialKind>;
pub type StatBinding = Binding<StatKind>;
pub type ContactMethodBinding = Binding<ContactMethodKind>;

impl<K: ContentKind> Binding<K> {
    pub fn new(id: impl Into<String>, section: impl Into<String>, default: K::Value) -> Self {
        Self {
            id: id.into(),
            section: section.into(),
            default,
            draft: None,
            kind: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn content_type(&self) -> ContentType {
        K::TYPE
    }

    pub fn default_value(&self) -> &K::Value {
        &self.default
    }

    /// Stored override when present and of this binding's shape, otherwise the
    /// default.
    pub fn effective(&self, store: &ContentStore) -> K::Value {
        let stored = store.get_content(&self.id).and_then(|entry| {
            let value = K::extract(&entry.content);
            if value.is_none() {
                warn!(
                    "Stored content for '{}' is {} but the binding expects {}; using default",
                    self.id, entry.kind, K::TYPE
                );
            }
            value
        });
        stored.unwrap_or_else(|| self.default.clone())
    }

    pub fn state(&self, store: &ContentStore) -> BindingState {
        if !store.is_edit_mode() {
            BindingState::Viewing
        } else if self.draft.is_some() {
            BindingState::Editing
        } else {
            BindingState::BrowsingEditable
        }
    }

    pub fn view(&self, store: &ContentStore) -> View<K::Value> {
        match (self.state(store), &self.draft) {
            (BindingState::Editing, Some(draft)) => View::Editing(draft.clone()),
            (state, _) => {
                let value = self.effective(store);
                let editable = state != BindingState::Viewing;
                if K::is_tombstone(&value) {
                    View::Tombstone { editable }
                } else if editable {
                    View::Editable(value)
                } else {
                    View::Static(K::for_display(value))
                }
            }
        }
    }

    /// Seeds a draft from the effective value. Only allowed in edit mode.
    pub fn start_edit(&mut self, store: &ContentStore) -> Result<(), BindingError> {
        if !store.is_edit_mode() {
            return Err(BindingError::EditModeOff);
        }
        self.draft = Some(K::seed_draft(self.effective(store)));
        debug!("Started editing '{}'", self.id);
        Ok(())
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&K::Value> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Result<&mut K::Value, BindingError> {
        self.draft.as_mut().ok_or(BindingError::NotEditing)
    }

    pub fn set_draft(&mut self, value: K::Value) -> Result<(), BindingError> {
        *self.draft_mut()? = value;
        Ok(())
    }

    /// Writes the draft to the store as one update and leaves editing. On a
    /// rejected update the draft is kept.
    pub fn commit(&mut self, store: &mut ContentStore) -> Result<(), BindingError> {
        let draft = self.draft.take().ok_or(BindingError::NotEditing)?;
        if let Err(e) = store.update_content(&self.id, K::wrap(draft.clone()), &self.section) {
            self.draft = Some(draft);
            return Err(e.into());
        }
        debug!("Committed '{}'", self.id);
        Ok(())
    }

    /// Drops the draft without writing. Returns whether an edit was active.
    pub fn cancel(&mut self) -> bool {
        self.draft.take().is_some()
    }

    pub(crate) fn clear_draft(&mut self) {
        self.draft = None;
    }
}
