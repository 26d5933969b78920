mod section;
pub use self::section::{ParseSectionError, Section};

mod subsection;
pub use self::subsection::{Subsection, SubsectionCode};
