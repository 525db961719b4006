mod description;
mod repository;
mod state;

pub use description::{EntityCategory, EntityDescription, FieldSource, Platform, Subscription};
pub use repository::{StateRepository, StateWriter};
pub use state::EntityState;
