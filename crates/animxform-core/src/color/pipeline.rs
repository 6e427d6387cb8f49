//! Ordered list of palette transforms applied across a stream.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::palette::{Color, Palette};
use crate::stream::ImageStream;

use super::change::{apply_color_changes, ColorChange};
use super::filter::ExternalFilter;

/// A palette-mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorTransform {
    /// First-match-wins color replacement rules.
    ColorChange { changes: Vec<ColorChange> },
    /// Remap through a shell command.
    ExternalFilter(ExternalFilter),
}

/// Identifies a [`ColorTransform`] variant, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTransformKind {
    ColorChange,
    ExternalFilter,
}

impl ColorTransform {
    pub fn kind(&self) -> ColorTransformKind {
        match self {
            ColorTransform::ColorChange { .. } => ColorTransformKind::ColorChange,
            ColorTransform::ExternalFilter(_) => ColorTransformKind::ExternalFilter,
        }
    }

    /// Apply to a single palette.
    pub fn apply_to_palette(&self, palette: &mut Palette) -> Result<(), TransformError> {
        match self {
            ColorTransform::ColorChange { changes } => {
                apply_color_changes(palette, changes);
                Ok(())
            }
            ColorTransform::ExternalFilter(filter) => filter.apply(palette),
        }
    }
}

/// Palette transforms in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTransformPipeline {
    transforms: Vec<ColorTransform>,
}

impl ColorTransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn transforms(&self) -> &[ColorTransform] {
        &self.transforms
    }

    /// Add a transform at the end.
    ///
    /// Color changes appended right after another color change join its rule
    /// list, so rules from repeated calls keep one evaluation order.
    pub fn append(&mut self, transform: ColorTransform) -> &mut Self {
        match transform {
            ColorTransform::ColorChange { changes: more } => match self.transforms.last_mut() {
                Some(ColorTransform::ColorChange { changes }) => changes.extend(more),
                _ => self
                    .transforms
                    .push(ColorTransform::ColorChange { changes: more }),
            },
            other => self.transforms.push(other),
        }
        self
    }

    /// Add a single `old -> new` color change rule.
    pub fn append_color_change(&mut self, old: Color, new: Color) -> &mut Self {
        self.append(ColorTransform::ColorChange {
            changes: vec![ColorChange::new(old, new)],
        })
    }

    /// Add an external filter command.
    pub fn append_filter(&mut self, filter: ExternalFilter) -> &mut Self {
        self.append(ColorTransform::ExternalFilter(filter))
    }

    /// Remove every transform of `kind`. Returns how many were removed.
    pub fn remove(&mut self, kind: ColorTransformKind) -> usize {
        let before = self.transforms.len();
        self.transforms.retain(|transform| transform.kind() != kind);
        before - self.transforms.len()
    }

    /// Apply every transform, in order, to the global palette and then to
    /// each frame's private palette.
    ///
    /// # Errors
    ///
    /// Only fatal conditions are returned; see [`ExternalFilter::apply`].
    pub fn apply(&self, stream: &mut ImageStream) -> Result<(), TransformError> {
        for transform in &self.transforms {
            if let Some(palette) = stream.global_palette.as_mut() {
                transform.apply_to_palette(palette)?;
            }
            for palette in stream.frames.iter_mut().filter_map(|f| f.palette.as_mut()) {
                transform.apply_to_palette(palette)?;
            }
        }
        Ok(())
    }
}
