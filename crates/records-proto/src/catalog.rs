//! Catalog items: one collected record with its metadata and cover.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_GENRE: &str = "Unknown";

/// A record in the collection.
///
/// Field names serialize in camelCase so cache files written by earlier
/// versions of the site load unchanged; `isLabelImage` and `genre` were added
/// later and default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Collection instance id; stable across runs and used as the cover file stem.
    pub id: u64,
    pub title: String,
    /// Artist names joined with ", ".
    pub artist: String,
    /// Release year, 0 when unknown.
    pub year: u32,
    pub cover_url: String,
    pub local_cover: String,
    #[serde(default)]
    pub is_label_image: bool,
    #[serde(default = "default_genre")]
    pub genre: String,
}

fn default_genre() -> String {
    UNKNOWN_GENRE.to_string()
}

impl CatalogItem {
    pub fn with_label_image(mut self, is_label_image: bool) -> Self {
        self.is_label_image = is_label_image;
        self
    }

    /// File name of the downloaded cover inside the covers directory.
    pub fn cover_file_name(&self) -> String {
        cover_file_name(self.id)
    }

    /// "Title (1997)" or just "Title" when the year is unknown.
    pub fn display_title(&self) -> String {
        if self.year > 0 {
            format!("{} ({})", self.title, self.year)
        } else {
            self.title.clone()
        }
    }
}

pub fn cover_file_name(id: u64) -> String {
    format!("{}.jpg", id)
}

/// Placeholder collection used when the catalog service is unavailable.
pub fn mock_catalog() -> Vec<CatalogItem> {
    const ALBUMS: &[(&str, &str, u32, &str)] = &[
        ("Random Access Memories", "Daft Punk", 2013, "Electronic"),
        ("In Rainbows", "Radiohead", 2007, "Rock"),
        ("Currents", "Tame Impala", 2015, "Rock"),
        ("Channel Orange", "Frank Ocean", 2012, "Funk / Soul"),
        ("To Pimp a Butterfly", "Kendrick Lamar", 2015, "Hip Hop"),
        ("Blonde", "Frank Ocean", 2016, "Funk / Soul"),
        ("OK Computer", "Radiohead", 1997, "Rock"),
        ("Discovery", "Daft Punk", 2001, "Electronic"),
        ("The Dark Side of the Moon", "Pink Floyd", 1973, "Rock"),
        ("Abbey Road", "The Beatles", 1969, "Rock"),
        ("Rumours", "Fleetwood Mac", 1977, "Rock"),
        ("Born to Run", "Bruce Springsteen", 1975, "Rock"),
    ];

    ALBUMS
        .iter()
        .enumerate()
        .map(|(index, (title, artist, year, genre))| {
            let placeholder = placeholder_cover(title);
            CatalogItem {
                id: index as u64 + 1,
                title: title.to_string(),
                artist: artist.to_string(),
                year: *year,
                cover_url: placeholder.clone(),
                local_cover: placeholder,
                is_label_image: false,
                genre: genre.to_string(),
            }
        })
        .collect()
}

fn placeholder_cover(title: &str) -> String {
    let label: String = title.chars().take(10).collect();
    format!(
        "https://placehold.co/600x600/1a1a1a/ffffff?text={}",
        urlencoding::encode(&label)
    )
}
