//! Domain entities for WorldWeaver.

mod campaign;
mod character;
mod encounter;
mod location;
mod lore;
mod notification;

pub use campaign::Campaign;
pub use character::{Ability, AbilityScores, Alignment, Character, CharacterType, Spellcasting};
pub use encounter::{Encounter, EncounterDifficulty, EncounterParticipant, ParticipantType};
pub use location::{Location, LocationType, MapCoordinates};
pub use lore::{LoreCategory, LoreEntry};
pub use notification::Notification;
