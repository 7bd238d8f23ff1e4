use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{info, warn};

use crate::binding::{Binding, ImageKind};
use crate::content_model::{ContentPayload, ImageContent};
use crate::content_store::ContentStore;
use crate::error::BindingError;

/// A file picked as the replacement image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl Binding<ImageKind> {
    /// Validates `upload` and puts it into the draft as a `data:` URL preview.
    /// Nothing is stored until [`commit`](Binding::commit).
    pub fn select_file(&mut self, upload: &ImageUpload, max_bytes: usize) -> Result<(), BindingError> {
        if !upload.mime_type.starts_with("image/") {
            warn!("Rejected '{}': not an image ({})", upload.file_name, upload.mime_type);
            return Err(BindingError::InvalidImage(format!(
                "'{}' is not an image file",
                upload.file_name
            )));
        }
        if upload.bytes.len() > max_bytes {
            warn!("Rejected '{}': {} bytes", upload.file_name, upload.bytes.len());
            return Err(BindingError::InvalidImage(format!(
                "'{}' is larger than {} bytes",
                upload.file_name, max_bytes
            )));
        }

        let draft = self.draft_mut()?;
        draft.src = upload.data_url();
        draft.original_file = Some(upload.file_name.clone());
        Ok(())
    }

    pub fn set_alt(&mut self, alt: impl Into<String>) -> Result<(), BindingError> {
        self.draft_mut()?.alt = alt.into();
        Ok(())
    }

    /// Stores the deleted-image tombstone. Any draft is dropped.
    pub fn delete(&mut self, store: &mut ContentStore) -> Result<(), BindingError> {
        if !store.is_edit_mode() {
            return Err(BindingError::EditModeOff);
        }
        store.update_content(self.id(), ContentPayload::Image(ImageContent::tombstone()), self.section())?;
        self.clear_draft();
        info!("Image '{}' deleted", self.id());
        Ok(())
    }
}
