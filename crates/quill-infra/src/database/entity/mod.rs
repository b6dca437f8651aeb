//! SeaORM entity definitions mirroring the domain model.

pub mod post;
pub mod user;
