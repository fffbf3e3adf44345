//! Ports: the traits the services depend on, implemented by adapters.

mod error;
mod repos;

pub use error::RepoError;
pub use repos::{CampaignRepo, CharacterRepo, ClockPort, EncounterRepo, LocationRepo, LoreRepo};

#[cfg(test)]
pub use repos::{
    MockCampaignRepo, MockCharacterRepo, MockEncounterRepo, MockLocationRepo, MockLoreRepo,
};
