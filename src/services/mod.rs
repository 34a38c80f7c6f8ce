#[cfg(test)]
pub(crate) mod fake;
mod shows;
mod tmdb;

pub use shows::ShowService;
pub use tmdb::{backdrop_url, poster_url, ExternalIds, ShowCatalog, TimeWindow, TmdbClient};
