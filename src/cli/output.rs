use crate::models::{
    EpisodeWatched, Progress, SearchResult, SeasonDetails, Show, ShowProgress, TrackedShow,
};
use crate::services::{backdrop_url, poster_url};

pub fn render_search(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No shows found".to_string();
    }
    results
        .iter()
        .map(|r| {
            let year = r
                .first_air_date
                .as_deref()
                .and_then(|d| d.get(..4))
                .unwrap_or("????");
            let rating = r
                .vote_average
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string());
            format!("{:>8}  {} ({})  ★ {}", r.id, r.name, year, rating)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_show(show: &Show) -> String {
    let mut lines = vec![format!("{} [{}]", show.title, show.id)];
    if let Some(date) = &show.first_air_date {
        lines.push(format!("First aired: {}", date));
    }
    lines.push(format!(
        "Seasons: {}  Episodes: {}",
        optional(show.total_seasons),
        optional(show.total_episodes)
    ));
    if !show.genres.is_empty() {
        lines.push(format!("Genres: {}", show.genres.replace(',', ", ")));
    }
    if let Some(rating) = show.tmdb_rating {
        lines.push(format!("Rating: {:.1}", rating));
    }
    if let Some(url) = poster_url(show.poster_path.as_deref(), "w300") {
        lines.push(format!("Poster: {}", url));
    }
    if let Some(url) = backdrop_url(show.backdrop_path.as_deref(), "w780") {
        lines.push(format!("Backdrop: {}", url));
    }
    if !show.overview.is_empty() {
        lines.push(String::new());
        lines.push(show.overview.clone());
    }
    lines.join("\n")
}

pub fn render_season(season: &SeasonDetails) -> String {
    let mut lines = vec![format!(
        "{} ({} episodes)",
        season
            .name
            .clone()
            .unwrap_or_else(|| format!("Season {}", season.season_number)),
        season.episodes.len()
    )];
    for ep in &season.episodes {
        lines.push(format!(
            "  E{:02}  {}  {}",
            ep.episode_number,
            ep.air_date.as_deref().unwrap_or("          "),
            ep.name.as_deref().unwrap_or("")
        ));
    }
    lines.join("\n")
}

pub fn render_tracked(shows: &[TrackedShow]) -> String {
    if shows.is_empty() {
        return "Your list is empty".to_string();
    }
    shows
        .iter()
        .map(|s| {
            format!(
                "{:>8}  {}{}  [{}]  added {}",
                s.show_id,
                s.title,
                if s.favorite { " ♥" } else { "" },
                s.status,
                s.added_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_watched(episodes: &[EpisodeWatched]) -> String {
    if episodes.is_empty() {
        return "No episodes watched".to_string();
    }
    episodes
        .iter()
        .map(|ep| {
            format!(
                "S{:02}E{:02}  {}",
                ep.season,
                ep.episode,
                ep.watched_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_progress(show_id: i64, progress: &Progress) -> String {
    format!(
        "Show {}: {}/{} episodes ({:.1}%)",
        show_id, progress.watched, progress.total, progress.percentage
    )
}

pub fn render_all_progress(rows: &[ShowProgress]) -> String {
    if rows.is_empty() {
        return "No tracked shows".to_string();
    }
    rows.iter()
        .map(|p| {
            format!(
                "{:>8}  {:<32} {:>4}/{:<4} {:>5.1}%  [{}]{}",
                p.show_id,
                p.title,
                p.watched_episodes,
                p.total_episodes,
                p.percentage,
                p.status,
                if p.favorite { " ♥" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn optional(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}
