mod episode;
mod show;
mod user;

pub use episode::{EpisodeWatched, Progress, ShowProgress};
pub use show::{
    CatalogShow, Genre, SearchResponse, SearchResult, SeasonDetails, SeasonEpisode, Show,
    ShowStatus, TrackedShow,
};
pub use user::{Identity, User};
