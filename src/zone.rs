//! Proportional zone descriptors and pixel-accurate cropping.
//!
//! Zones are defined as fractions of the source image so the same descriptor
//! works at any capture resolution. Resolution happens per image: fractional
//! bounds are rounded to pixels, then clamped to the actual dimensions.

use std::collections::HashMap;

use crate::error::PipelineError;
use crate::model::{DocumentType, ImageBuffer};

/// Named sub-region of a document image, given as proportional bounds.
///
/// All bounds are fractions in `[0, 1]` of the source width/height.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDescriptor {
    pub name: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A zone resolved against a concrete image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl ZoneDescriptor {
    /// Create a descriptor, rejecting bounds outside `[0, 1]`.
    #[allow(dead_code)]
    pub fn new(
        name: &str,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, PipelineError> {
        for (label, value) in [
            ("left", left),
            ("top", top),
            ("width", width),
            ("height", height),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidZone(format!(
                    "zone '{name}': {label}={value} is outside [0, 1]"
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            left,
            top,
            width,
            height,
        })
    }

    /// The machine readable zone strip at the bottom of a passport.
    pub fn mrz() -> Self {
        Self {
            name: "mrz".to_string(),
            left: 0.05,
            top: 0.75,
            width: 0.90,
            height: 0.20,
        }
    }

    /// Resolve against concrete pixel dimensions.
    ///
    /// Rectangles overflowing the right/bottom edge are shrunk to fit. A
    /// rectangle left with zero width or height is an error.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> Result<PixelRect, PipelineError> {
        let left = (f64::from(image_width) * self.left).round() as u32;
        let top = (f64::from(image_height) * self.top).round() as u32;
        let mut width = (f64::from(image_width) * self.width).round() as u32;
        let mut height = (f64::from(image_height) * self.height).round() as u32;

        if left.saturating_add(width) > image_width {
            width = image_width.saturating_sub(left);
        }
        if top.saturating_add(height) > image_height {
            height = image_height.saturating_sub(top);
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidZone(format!(
                "zone '{}' resolves to an empty rectangle on a {}x{} image",
                self.name, image_width, image_height
            )));
        }

        Ok(PixelRect {
            left,
            top,
            width,
            height,
        })
    }
}

/// Extract the zone's sub-image from an encoded buffer.
pub fn crop(buffer: &ImageBuffer, zone: &ZoneDescriptor) -> Result<ImageBuffer, PipelineError> {
    let image = buffer.decode()?;
    let rect = zone.resolve(image.width(), image.height())?;

    tracing::debug!(
        zone = %zone.name,
        left = rect.left,
        top = rect.top,
        width = rect.width,
        height = rect.height,
        "cropping zone"
    );

    let cropped = image.crop_imm(rect.left, rect.top, rect.width, rect.height);
    ImageBuffer::from_image(&cropped)
}

/// Caller intent for zone selection on a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSelection {
    /// Use the document type's default zone, if it has one.
    Auto,
    /// Recognize the full image (callers that pre-crop client-side).
    Full,
    /// A named zone from the registry.
    Named(String),
}

impl ZoneSelection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            None => Self::Auto,
            Some(s) if s.is_empty() || s == "auto" => Self::Auto,
            Some(s) if s == "full" => Self::Full,
            Some(s) => Self::Named(s),
        }
    }
}

/// Registry of named zones plus per-document-type defaults.
///
/// New zones register by name; the cropping algorithm never changes.
pub struct ZoneRegistry {
    zones: HashMap<String, ZoneDescriptor>,
    defaults: HashMap<DocumentType, String>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self {
            zones: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    /// Registry pre-populated with the MRZ strip, used by passports.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ZoneDescriptor::mrz());
        registry.set_default(DocumentType::Passport, "mrz");
        registry
    }

    pub fn register(&mut self, zone: ZoneDescriptor) {
        self.zones.insert(zone.name.clone(), zone);
    }

    pub fn set_default(&mut self, document_type: DocumentType, zone_name: &str) {
        self.defaults.insert(document_type, zone_name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&ZoneDescriptor> {
        self.zones.get(name)
    }

    pub fn default_for(&self, document_type: DocumentType) -> Option<&ZoneDescriptor> {
        self.defaults
            .get(&document_type)
            .and_then(|name| self.zones.get(name))
    }
}
