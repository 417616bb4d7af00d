pub mod doctor;
pub mod export;
pub mod interact;
pub mod stats;
