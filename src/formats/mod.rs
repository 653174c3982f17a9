//! Document formats handled by keysync.
//!
//! - [`tanker`]: the translation service's XML envelope, used on the wire.
//! - [`strings`]: Apple `.strings` tables written by the extraction tool.

pub mod strings;
pub mod tanker;

// Reexporting the formats for easier access
pub use strings::Format as StringsFormat;
pub use tanker::Format as TankerFormat;
