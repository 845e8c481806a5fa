//! Print Profile
//!
//! Single source for the raster limits applied to offer images.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrintSpecError {
    #[error("DPI must be between 72 and 600, got {0}")]
    Dpi(u32),

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    Quality(u8),
}

/// Where the active print profile came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintAuthority {
    #[default]
    System,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageSize {
    A4,
}

impl PageSize {
    /// Long edge in millimetres
    pub fn long_edge_mm(&self) -> f64 {
        match self {
            PageSize::A4 => 297.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSpec {
    pub authority: PrintAuthority,
    pub dpi: u32,
    pub page: PageSize,
    pub jpeg_quality: u8,
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            authority: PrintAuthority::System,
            dpi: 96,
            page: PageSize::A4,
            jpeg_quality: 50,
        }
    }
}

impl PrintSpec {
    pub fn from_user(dpi: u32, jpeg_quality: u8) -> Result<Self, PrintSpecError> {
        if !(72..=600).contains(&dpi) {
            return Err(PrintSpecError::Dpi(dpi));
        }
        if !(1..=100).contains(&jpeg_quality) {
            return Err(PrintSpecError::Quality(jpeg_quality));
        }
        Ok(Self {
            authority: PrintAuthority::User,
            dpi,
            page: PageSize::A4,
            jpeg_quality,
        })
    }

    /// Widest raster worth embedding: the page's long edge at the profile DPI.
    pub fn max_image_width(&self) -> u32 {
        (self.page.long_edge_mm() / MM_PER_INCH * self.dpi as f64).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_profile_width() {
        let spec = PrintSpec::default();
        assert_eq!(spec.authority, PrintAuthority::System);
        assert_eq!(spec.max_image_width(), 1122);
        assert_eq!(spec.jpeg_quality, 50);
    }

    #[test]
    fn test_user_profile_validated() {
        assert_eq!(PrintSpec::from_user(50, 50), Err(PrintSpecError::Dpi(50)));
        assert_eq!(PrintSpec::from_user(150, 0), Err(PrintSpecError::Quality(0)));

        let spec = PrintSpec::from_user(150, 70).unwrap();
        assert_eq!(spec.authority, PrintAuthority::User);
        assert_eq!(spec.max_image_width(), 1753);
    }
}
