//! Global layout settings.

use crate::model::{EdgeInsets, Size};
use thiserror::Error;

/// Rejected settings value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// A spacing, inset or size component was negative.
    #[error("{field} must be non-negative (got {value})")]
    Negative {
        /// Name of the offending setting.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A spacing, inset or size component was NaN or infinite.
    #[error("{field} must be finite")]
    NotFinite {
        /// Name of the offending setting.
        field: &'static str,
    },
}

/// Settings consumed by every layout pass.
///
/// Immutable per pass; swapped wholesale through
/// `InvalidationReason::SettingsChanged`.
///
/// # Equality Semantics
/// Two settings are equal if they would produce identical layouts for the
/// same size table. The engine skips relayout when handed equal settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    estimated_item_size: Size,
    inter_item_spacing: f64,
    inter_section_spacing: f64,
    additional_insets: EdgeInsets,
}

impl LayoutSettings {
    /// Validated constructor.
    ///
    /// # Errors
    /// Any negative or non-finite component.
    pub fn new(
        estimated_item_size: Size,
        inter_item_spacing: f64,
        inter_section_spacing: f64,
        additional_insets: EdgeInsets,
    ) -> Result<Self, SettingsError> {
        check("estimated_item_size.width", estimated_item_size.width)?;
        check("estimated_item_size.height", estimated_item_size.height)?;
        check("inter_item_spacing", inter_item_spacing)?;
        check("inter_section_spacing", inter_section_spacing)?;
        check("additional_insets.top", additional_insets.top)?;
        check("additional_insets.left", additional_insets.left)?;
        check("additional_insets.bottom", additional_insets.bottom)?;
        check("additional_insets.right", additional_insets.right)?;

        Ok(Self {
            estimated_item_size,
            inter_item_spacing,
            inter_section_spacing,
            additional_insets,
        })
    }

    /// Copy with a different estimated item size.
    pub fn with_estimated_item_size(self, size: Size) -> Result<Self, SettingsError> {
        Self::new(
            size,
            self.inter_item_spacing,
            self.inter_section_spacing,
            self.additional_insets,
        )
    }

    /// Copy with a different gap between items of a section.
    pub fn with_inter_item_spacing(self, spacing: f64) -> Result<Self, SettingsError> {
        Self::new(
            self.estimated_item_size,
            spacing,
            self.inter_section_spacing,
            self.additional_insets,
        )
    }

    /// Copy with a different gap between sections.
    pub fn with_inter_section_spacing(self, spacing: f64) -> Result<Self, SettingsError> {
        Self::new(
            self.estimated_item_size,
            self.inter_item_spacing,
            spacing,
            self.additional_insets,
        )
    }

    /// Copy with different edge padding.
    pub fn with_additional_insets(self, insets: EdgeInsets) -> Result<Self, SettingsError> {
        Self::new(
            self.estimated_item_size,
            self.inter_item_spacing,
            self.inter_section_spacing,
            insets,
        )
    }

    /// Placeholder size for items without a hint.
    pub fn estimated_item_size(&self) -> Size {
        self.estimated_item_size
    }

    /// Gap between consecutive items of a section.
    pub fn inter_item_spacing(&self) -> f64 {
        self.inter_item_spacing
    }

    /// Gap between consecutive sections.
    pub fn inter_section_spacing(&self) -> f64 {
        self.inter_section_spacing
    }

    /// Padding around the whole layout.
    pub fn additional_insets(&self) -> EdgeInsets {
        self.additional_insets
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            estimated_item_size: Size::new(320.0, 44.0),
            inter_item_spacing: 4.0,
            inter_section_spacing: 16.0,
            additional_insets: EdgeInsets::ZERO,
        }
    }
}

fn check(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if !value.is_finite() {
        Err(SettingsError::NotFinite { field })
    } else if value < 0.0 {
        Err(SettingsError::Negative { field, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let defaults = LayoutSettings::default();
        let rebuilt = LayoutSettings::new(
            defaults.estimated_item_size(),
            defaults.inter_item_spacing(),
            defaults.inter_section_spacing(),
            defaults.additional_insets(),
        );
        assert_eq!(rebuilt, Ok(defaults));
    }

    #[test]
    fn rejects_negative_item_spacing() {
        let result = LayoutSettings::default().with_inter_item_spacing(-2.0);
        assert_eq!(
            result,
            Err(SettingsError::Negative {
                field: "inter_item_spacing",
                value: -2.0
            })
        );
    }

    #[test]
    fn rejects_negative_inset() {
        let result =
            LayoutSettings::default().with_additional_insets(EdgeInsets::new(0.0, 0.0, -1.0, 0.0));
        assert!(matches!(
            result,
            Err(SettingsError::Negative {
                field: "additional_insets.bottom",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(
            LayoutSettings::default().with_inter_section_spacing(f64::NAN),
            Err(SettingsError::NotFinite {
                field: "inter_section_spacing"
            })
        );
        assert!(LayoutSettings::default()
            .with_estimated_item_size(Size::new(f64::INFINITY, 10.0))
            .is_err());
    }

    #[test]
    fn zero_values_are_accepted() {
        let settings = LayoutSettings::new(Size::ZERO, 0.0, 0.0, EdgeInsets::ZERO);
        assert!(settings.is_ok());
    }

    #[test]
    fn equality_detects_changes() {
        let a = LayoutSettings::default();
        let b = a.with_inter_item_spacing(8.0).expect("valid spacing");
        assert_ne!(a, b);
        assert_eq!(a, LayoutSettings::default());
    }
}
