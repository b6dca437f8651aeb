//! Application services orchestrating domain rules over the ports.

mod content;
mod identity;

pub use content::{ContentService, CreatePostInput, PostFilter, UpdatePostInput, can_modify};
pub use identity::{IdentityService, RegisterInput};
