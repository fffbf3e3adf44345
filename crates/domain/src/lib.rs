pub mod dnd5e;
pub mod entities;
pub mod error;
pub mod ids;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    Ability, AbilityScores, Alignment, Campaign, Character, CharacterType, Encounter,
    EncounterDifficulty, EncounterParticipant, Location, LocationType, LoreCategory, LoreEntry,
    MapCoordinates, Notification, ParticipantType, Spellcasting,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{
    CampaignId, CharacterId, EncounterId, LocationId, LoreEntryId, NotificationId, ParticipantId,
};
