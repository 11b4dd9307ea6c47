use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Extension (lowercase, no dot) of binary logic images.
pub const LOGIC_IMAGE_EXTENSION: &str = "rbf";
/// Extension (lowercase, no dot) of arcade definitions.
pub const ARCADE_DEFINITION_EXTENSION: &str = "mra";
/// Separator between acceptable filenames inside one archive reference.
pub const ALTERNATIVE_SEPARATOR: char = '|';

// Codename is everything up to the first underscore, followed by an 8-digit
// date and an optional suffix that must not contain another dot. The extension
// is matched case-sensitively even though `FileKind` is not: an `.RBF` core is
// indexed, just without a codename.
regex!(LOGIC_IMAGE_NAME_REGEX, r"^([^_]+)_(\d{8})[^.]*\.rbf$");
