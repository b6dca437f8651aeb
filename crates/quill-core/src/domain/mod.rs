//! Domain entities - the core business objects.

mod post;
mod user;

pub mod slug;

pub use post::{NewPost, Post};
pub use user::{NewUser, User};
