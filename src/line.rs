//! Processed lines: display text with stable image tokens plus the images
//! those tokens stand for.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::catalog::ResourceHandle;
use crate::placeholder::find_tokens;

/// An image chosen for the `slot_index`-th placeholder of its line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImageRef {
    pub slot_index: usize,
    pub resource: ResourceHandle,
}

impl ResolvedImageRef {
    pub fn new(slot_index: usize, resource: ResourceHandle) -> Self {
        ResolvedImageRef {
            slot_index,
            resource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The text carries `{{IMG_<slot>}}` but no image has that slot
    MissingImage { slot: usize },
    /// An image has a slot no token in the text refers to
    OrphanImage { slot: usize },
    /// Two images share a slot
    DuplicateImage { slot: usize },
    /// The same token appears twice in the text
    DuplicateToken { slot: usize },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::MissingImage { slot } => {
                write!(f, "Token IMG_{} has no matching image", slot)
            }
            LineError::OrphanImage { slot } => {
                write!(f, "Image for slot {} has no token in the text", slot)
            }
            LineError::DuplicateImage { slot } => {
                write!(f, "More than one image for slot {}", slot)
            }
            LineError::DuplicateToken { slot } => {
                write!(f, "Token IMG_{} appears more than once", slot)
            }
        }
    }
}

impl std::error::Error for LineError {}

/// A resolved line, immutable once built.
///
/// Every `{{IMG_<i>}}` token in `text` has exactly one image with
/// `slot_index == i`, and every image has its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedLine {
    text: String,
    images: Vec<ResolvedImageRef>,
}

impl ProcessedLine {
    /// Build a line, checking that tokens and images correspond 1:1
    pub fn new(
        text: impl Into<String>,
        images: Vec<ResolvedImageRef>,
    ) -> Result<Self, LineError> {
        let line = ProcessedLine {
            text: text.into(),
            images,
        };
        line.check()?;
        Ok(line)
    }

    /// A line without images. Token-shaped text is rejected the same way as in `new`.
    pub fn plain(text: impl Into<String>) -> Result<Self, LineError> {
        Self::new(text, Vec::new())
    }

    /// Used by the preprocessor, which builds tokens and images together
    pub(crate) fn from_parts(text: String, images: Vec<ResolvedImageRef>) -> Self {
        let line = ProcessedLine { text, images };
        debug_assert_eq!(line.check(), Ok(()));
        line
    }

    #[cfg(test)]
    pub(crate) fn unchecked(text: &str, images: Vec<ResolvedImageRef>) -> Self {
        ProcessedLine {
            text: text.to_string(),
            images,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[ResolvedImageRef] {
        &self.images
    }

    pub fn image(&self, slot: usize) -> Option<&ResolvedImageRef> {
        self.images.iter().find(|image| image.slot_index == slot)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }

    /// Verify the token/image correspondence
    pub fn check(&self) -> Result<(), LineError> {
        let mut slots = HashSet::new();
        for image in &self.images {
            if !slots.insert(image.slot_index) {
                return Err(LineError::DuplicateImage {
                    slot: image.slot_index,
                });
            }
        }

        let mut seen = HashSet::new();
        for token in find_tokens(&self.text) {
            if !seen.insert(token.slot) {
                return Err(LineError::DuplicateToken { slot: token.slot });
            }
            if !slots.contains(&token.slot) {
                return Err(LineError::MissingImage { slot: token.slot });
            }
        }

        match self.images.iter().find(|i| !seen.contains(&i.slot_index)) {
            Some(orphan) => Err(LineError::OrphanImage {
                slot: orphan.slot_index,
            }),
            None => Ok(()),
        }
    }
}

/// The line currently being revealed: a text prefix plus all images of its
/// line. Images only display once their token is fully part of the prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveLine {
    pub text: String,
    pub images: Vec<ResolvedImageRef>,
}

impl ActiveLine {
    /// Empty text carrying the images of `line`
    pub fn start(line: &ProcessedLine) -> Self {
        ActiveLine {
            text: String::new(),
            images: line.images.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::token;

    fn img(slot: usize) -> ResolvedImageRef {
        ResolvedImageRef::new(slot, ResourceHandle::new(format!("img-{}", slot)))
    }

    #[test]
    fn test_consistent_line() {
        let text = format!("{} and {}", token(0), token(1));
        let line = ProcessedLine::new(text, vec![img(0), img(1)]).unwrap();
        assert_eq!(line.image(1), Some(&img(1)));
        assert_eq!(line.image(2), None);
    }

    #[test]
    fn test_missing_image() {
        let err = ProcessedLine::new(token(3), vec![]).unwrap_err();
        assert_eq!(err, LineError::MissingImage { slot: 3 });
    }

    #[test]
    fn test_orphan_image() {
        let err = ProcessedLine::new("no tokens", vec![img(0)]).unwrap_err();
        assert_eq!(err, LineError::OrphanImage { slot: 0 });
    }

    #[test]
    fn test_duplicates() {
        let text = token(0);
        let err = ProcessedLine::new(text, vec![img(0), img(0)]).unwrap_err();
        assert_eq!(err, LineError::DuplicateImage { slot: 0 });

        let text = format!("{}{}", token(0), token(0));
        let err = ProcessedLine::new(text, vec![img(0)]).unwrap_err();
        assert_eq!(err, LineError::DuplicateToken { slot: 0 });
    }

    #[test]
    fn test_active_line_starts_empty_with_images() {
        let line = ProcessedLine::new(format!("{}!", token(0)), vec![img(0)]).unwrap();
        let active = ActiveLine::start(&line);
        assert_eq!(active.text, "");
        assert_eq!(active.images, vec![img(0)]);
        assert!(!active.is_empty());
        assert!(ActiveLine::default().is_empty());
    }
}
