/// Numeric catalog item identifier, the unit of work.
pub type ItemId = u64;

/// Everything needed to address one remote build listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub id:         ItemId,
    pub platform:   String,
    pub generation: u32,
}

impl FetchRequest {
    pub fn new(id: ItemId, platform: impl Into<String>, generation: u32) -> Self {
        Self {
            id,
            platform: platform.into(),
            generation,
        }
    }
}

impl std::fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}@generation={}",
            self.id, self.platform, self.generation
        )
    }
}
