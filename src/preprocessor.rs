/// Line preprocessor - resolves placeholders once and swaps them for stable tokens
use rand::Rng;
use std::sync::Arc;

use crate::catalog::AssetCatalog;
use crate::line::{ProcessedLine, ResolvedImageRef};
use crate::placeholder::{find_placeholders, token};

/// Turns raw script lines into [`ProcessedLine`]s.
///
/// Category placeholders draw a fresh resource on every `resolve` call, so a
/// batch must be resolved exactly once and the result kept.
pub struct Preprocessor<R: Rng> {
    catalog: Arc<AssetCatalog>,
    rng: R,
    images_enabled: bool,
}

impl<R: Rng> Preprocessor<R> {
    pub fn new(catalog: Arc<AssetCatalog>, rng: R) -> Self {
        Preprocessor {
            catalog,
            rng,
            images_enabled: true,
        }
    }

    /// Drop placeholders from the text instead of resolving them
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    pub fn set_images(&mut self, enabled: bool) {
        self.images_enabled = enabled;
    }

    pub fn images_enabled(&self) -> bool {
        self.images_enabled
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Resolve a batch of raw lines, in order
    pub fn resolve<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<ProcessedLine> {
        lines
            .iter()
            .map(|line| self.resolve_line(line.as_ref()))
            .collect()
    }

    /// Resolve one raw line
    pub fn resolve_line(&mut self, raw: &str) -> ProcessedLine {
        let placeholders = find_placeholders(raw);
        if placeholders.is_empty() {
            return ProcessedLine::from_parts(raw.to_string(), Vec::new());
        }

        let mut text = String::with_capacity(raw.len());
        let mut images = Vec::with_capacity(placeholders.len());
        let mut last = 0;

        for (slot, placeholder) in placeholders.iter().enumerate() {
            text.push_str(&raw[last..placeholder.span.start]);
            last = placeholder.span.end;

            if !self.images_enabled {
                continue;
            }

            let name = placeholder.name();
            let resource = self.catalog.pick(name, &mut self.rng);
            tracing::trace!(slot, name, %resource, "resolved placeholder");
            text.push_str(&token(slot));
            images.push(ResolvedImageRef::new(slot, resource));
        }
        text.push_str(&raw[last..]);

        ProcessedLine::from_parts(text, images)
    }
}
