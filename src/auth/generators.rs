/// Source of display names for new identities
pub trait UsernameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Pet name-based username generator
#[derive(Default)]
pub struct PetNameUsernameGenerator;

impl UsernameGenerator for PetNameUsernameGenerator {
    fn generate(&self) -> String {
        petname::Petnames::default().generate_one(2, "-")
    }
}
