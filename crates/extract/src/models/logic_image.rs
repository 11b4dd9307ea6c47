/// Fields encoded in a dated-codename logic image filename, such as
/// `NeoGeo_20210615_v2.rbf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicImageName {
    /// Everything before the first underscore.
    pub code_name: String,
    /// The 8-digit build date, kept verbatim (`YYYYMMDD` by convention, but
    /// never validated as a calendar date).
    pub code_date: String,
}
