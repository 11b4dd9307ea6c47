mod arcade;
mod kind;
mod logic_image;

pub use self::arcade::{ArcadeDefinition, ArchiveReference};
pub use self::kind::FileKind;
pub use self::logic_image::LogicImageName;
