use std::ops::Range;

use crate::binding::{Binding, ContentKind, RichTextKind};
use crate::error::BindingError;

/// Inline formatting offered by the rich-text toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    UnorderedList,
}

impl<K: ContentKind<Value = String>> Binding<K> {
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), BindingError> {
        *self.draft_mut()? = text.into();
        Ok(())
    }
}

impl Binding<RichTextKind> {
    /// Applies `command` to the byte range `selection` of the draft HTML.
    ///
    /// Bold and italic wrap the selection in `<strong>`/`<em>`. A list turns
    /// each non-empty line of the selection into an `<li>` of one `<ul>`.
    pub fn apply_format(&mut self, command: FormatCommand, selection: Range<usize>) -> Result<(), BindingError> {
        let draft = self.draft_mut()?;
        let Range { start, end } = selection;
        if start > end || end > draft.len() || !draft.is_char_boundary(start) || !draft.is_char_boundary(end) {
            return Err(BindingError::InvalidSelection { start, end });
        }

        let selected = &draft[start..end];
        let formatted = match command {
            FormatCommand::Bold => format!("<strong>{selected}</strong>"),
            FormatCommand::Italic => format!("<em>{selected}</em>"),
            FormatCommand::UnorderedList => {
                let items: String = selected
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| format!("<li>{line}</li>"))
                    .collect();
                format!("<ul>{items}</ul>")
            }
        };
        draft.replace_range(start..end, &formatted);
        Ok(())
    }
}
