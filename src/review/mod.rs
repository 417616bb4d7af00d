pub mod analytics;
pub mod engine;
pub mod store;
pub mod types;

pub use engine::{compute_next_state, presentation_delay, MetricsError};
pub use store::{StoreError, StoreResult};
pub use types::{Flashcard, InteractionEvent, ReviewState, StoredReviewState};
