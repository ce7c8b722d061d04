//! Pre-start checklist generation from a site-visit record.

pub mod generator;
mod rules;
pub mod types;

pub use generator::{Checklist, generate_checklist};
pub use types::{ChecklistItem, ItemSource, PromptResponse, Room, RoomType, SiteVisit};
