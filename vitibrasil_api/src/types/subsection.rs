//! Subsection types discovered on section landing pages.

use serde::{Deserialize, Serialize};

/// Opaque site identifier of a subsection (e.g. "subopt_01").
pub type SubsectionCode = String;

/// A named sub-category within a section, such as a product class under imports.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Subsection {
    /// Display name as shown on the selector button.
    pub name: String,

    /// Code sent back to the site as the `subopcao` parameter.
    pub code: SubsectionCode,
}
