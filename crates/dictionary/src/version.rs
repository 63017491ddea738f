use {
    crate::error::{Result, VersionTooOldSnafu},
    snafu::ensure,
    std::fmt,
};

/// Database property holding the version of the on-disk dictionary.
pub const CORE_VERSION_PROPERTY: &str = "DataDictionaryVersion";
/// Database property holding the version the database was created with.
pub const CREATE_VERSION_PROPERTY: &str = "CreateDataDictionaryVersion";

/// Version of the catalog format, compared by major number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DictionaryVersion {
    pub major: u32,
    pub minor: u32,
}

impl DictionaryVersion {
    pub const V10_0: Self = Self::new(120, 0);
    pub const V10_1: Self = Self::new(130, 0);
    pub const V10_2: Self = Self::new(140, 0);
    pub const V10_4: Self = Self::new(160, 0);
    pub const V10_6: Self = Self::new(180, 0);
    pub const V10_7: Self = Self::new(190, 0);

    pub const CURRENT: Self = Self::V10_7;

    pub const ALL: [Self; 6] = [
        Self::V10_0,
        Self::V10_1,
        Self::V10_2,
        Self::V10_4,
        Self::V10_6,
        Self::V10_7,
    ];

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn release(&self) -> &'static str {
        match self.major {
            120 => "10.0",
            130 => "10.1",
            140 => "10.2",
            160 => "10.4",
            180 => "10.6",
            190 => "10.7",
            _ => "unknown",
        }
    }

    pub fn to_property(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    pub fn from_property(value: &str) -> Option<Self> {
        let (major, minor) = value.split_once('.')?;
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }

    /// Fails unless this version is at least `required`.
    pub fn check(&self, required: DictionaryVersion, feature: &str) -> Result<()> {
        ensure!(
            self.major >= required.major,
            VersionTooOldSnafu {
                feature,
                required,
                actual: *self,
            }
        );
        Ok(())
    }
}

impl fmt::Display for DictionaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}.{})", self.release(), self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_round_trip() {
        let v = DictionaryVersion::V10_4;
        assert_eq!(DictionaryVersion::from_property(&v.to_property()), Some(v));
        assert_eq!(DictionaryVersion::from_property("garbage"), None);
    }

    #[test]
    fn gating() {
        assert!(DictionaryVersion::V10_6
            .check(DictionaryVersion::V10_2, "GRANT")
            .is_ok());

        let err = DictionaryVersion::V10_0
            .check(DictionaryVersion::V10_6, "CREATE SEQUENCE")
            .unwrap_err();
        assert!(err.to_string().contains("CREATE SEQUENCE"));
    }

    #[test]
    fn versions_are_ordered() {
        let mut sorted = DictionaryVersion::ALL;
        sorted.sort();
        assert_eq!(sorted, DictionaryVersion::ALL);
        assert_eq!(DictionaryVersion::CURRENT, *sorted.last().unwrap());
    }
}
