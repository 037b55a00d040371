//! Layout planning
//!
//! One global policy, derived from the number of configured fields: up to two
//! fields stack at full width, three or more wrap two per row. Hidden fields
//! count towards the total even though they are never rendered.

use crate::field::FormConfiguration;

/// Width, in percent, of each field in a two-per-row grid.
pub const FRACTIONAL_WIDTH_PERCENT: u8 = 48;

/// Width assigned to every field of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    /// The field spans the whole row.
    Full,
    /// The field takes the given percentage of the row.
    Fraction(u8),
}

impl FieldWidth {
    /// Returns the width in percent.
    pub fn percent(self) -> u8 {
        match self {
            Self::Full => 100,
            Self::Fraction(percent) => percent,
        }
    }

    /// Returns the width as a CSS length, e.g. `48%`.
    pub fn css(self) -> String {
        format!("{}%", self.percent())
    }
}

/// Sizing policy for one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlan {
    field_count: usize,
    width: FieldWidth,
}

impl LayoutPlan {
    /// Plans the layout for `field_count` configured fields.
    pub fn for_count(field_count: usize) -> Self {
        let width = if field_count <= 2 {
            FieldWidth::Full
        } else {
            FieldWidth::Fraction(FRACTIONAL_WIDTH_PERCENT)
        };
        Self { field_count, width }
    }

    /// Plans the layout for every field of a configuration, hidden ones included.
    pub fn for_config(config: &FormConfiguration) -> Self {
        Self::for_count(config.len())
    }

    /// Returns the number of fields the plan was computed for.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Returns the width shared by every field.
    pub fn width(&self) -> FieldWidth {
        self.width
    }

    /// Returns the shared width as a CSS length.
    pub fn css_width(&self) -> String {
        self.width.css()
    }

    /// Returns the number of fields per row.
    pub fn columns(&self) -> usize {
        match self.width {
            FieldWidth::Full => 1,
            FieldWidth::Fraction(_) => 2,
        }
    }
}
