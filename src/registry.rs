use std::collections::BTreeMap;

use log::error;

use crate::binding::{Binding, ContentKind};
use crate::content_model::ContentType;
use crate::error::{ContentError, RegistryError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub section: String,
    pub kind: ContentType,
}

/// Content ids claimed by the page's bindings.
///
/// Two call sites sharing an id would silently overwrite each other's
/// content, so registering an id twice is an error, reported when the page
/// is assembled rather than on the first edit.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: BTreeMap<String, Registration>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, section: &str, kind: ContentType) -> Result<(), RegistryError> {
        if id.is_empty() {
            return Err(ContentError::EmptyId.into());
        }
        if section.is_empty() {
            return Err(ContentError::EmptySection.into());
        }
        if let Some(existing) = self.bindings.get(id) {
            error!(
                "Content id '{}' registered twice (sections '{}' and '{}')",
                id, existing.section, section
            );
            return Err(RegistryError::DuplicateId {
                id: id.to_string(),
                first_section: existing.section.clone(),
            });
        }
        self.bindings.insert(
            id.to_string(),
            Registration {
                section: section.to_string(),
                kind,
            },
        );
        Ok(())
    }

    /// Registers `id` and builds its binding.
    pub fn bind<K: ContentKind>(
        &mut self,
        id: &str,
        section: &str,
        default: K::Value,
    ) -> Result<Binding<K>, RegistryError> {
        self.register(id, section, K::TYPE)?;
        Ok(Binding::new(id, section, default))
    }

    pub fn get(&self, id: &str) -> Option<&Registration> {
        self.bindings.get(id)
    }

    pub fn ids_in_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a str> {
        self.bindings
            .iter()
            .filter(move |(_, registration)| registration.section == section)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
