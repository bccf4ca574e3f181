//! Per-entry classification inside an extracted archive.

use crate::pipeline::is_image_name;

/// What happens to a file found in an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Name starts with `.`; left out of the output
    Hidden,
    /// Image extension; rendered, or copied on failure
    Image,
    /// Anything else; copied verbatim
    Other,
}

impl EntryClass {
    pub fn of(file_name: &str) -> Self {
        if file_name.starts_with('.') {
            EntryClass::Hidden
        } else if is_image_name(file_name) {
            EntryClass::Image
        } else {
            EntryClass::Other
        }
    }
}
