use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{ArtistInfo, TourDate};

/// Static artist records served by `/api/artist/*`.
///
/// The data lives in memory for the lifetime of the process; there is no
/// write path.
pub struct ArtistStore {
    info: ArtistInfo,
    tour_dates: Vec<TourDate>,
}

impl ArtistStore {
    pub fn new(info: ArtistInfo, tour_dates: Vec<TourDate>) -> Self {
        Self { info, tour_dates }
    }

    /// The built-in AURA VOX records.
    pub fn seeded() -> Self {
        let now = Utc::now();

        let info = ArtistInfo {
            id: 1,
            name: "AURA VOX".to_string(),
            bio: "AURA VOX is the electronic music project of Alex Vega, a producer and performer \
                  known for creating immersive audio experiences that blend atmospheric \
                  soundscapes with driving beats. Based in Berlin, AURA VOX has been pushing the \
                  boundaries of electronic music since 2018."
                .to_string(),
            location: "Berlin, Germany".to_string(),
            since: 2018,
            monthly_listeners: Some(500_000),
            releases: Some(42),
            countries_visited: Some(23),
            genres: ["Electronic", "Ambient", "Techno", "Downtempo", "Experimental"]
                .iter()
                .map(|g| g.to_string())
                .collect(),
            created_at: now,
            updated_at: now,
        };

        let tour_dates = [
            (1, "2023-11-15", "Club Pulse", "Berlin, Germany"),
            (2, "2023-12-03", "Warehouse 34", "London, UK"),
            (3, "2023-12-18", "Le Circuit", "Paris, France"),
            (4, "2024-01-22", "Sonic Space", "Amsterdam, Netherlands"),
        ]
        .into_iter()
        .map(|(id, date, venue, location)| TourDate {
            id,
            date: midnight_utc(date),
            venue: venue.to_string(),
            location: location.to_string(),
            ticket_link: Some(format!("https://example.com/tickets/{id}")),
            created_at: now,
            updated_at: now,
        })
        .collect();

        Self::new(info, tour_dates)
    }

    pub fn artist_info(&self) -> &ArtistInfo {
        &self.info
    }

    pub fn tour_dates(&self) -> &[TourDate] {
        &self.tour_dates
    }
}

impl Default for ArtistStore {
    fn default() -> Self {
        Self::seeded()
    }
}

fn midnight_utc(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}
