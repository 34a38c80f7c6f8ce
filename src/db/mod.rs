mod episodes;
mod progress;
mod repository;
mod schema;
mod shows;

pub use episodes::MAX_SEASON_EPISODES;
pub use repository::Repository;
pub use shows::{is_stale, is_stale_at, DEFAULT_MAX_AGE_DAYS};
