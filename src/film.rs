use std::error;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Film {
    id: i64,
    title: String,
    description: String,
    release_date: NaiveDate,
    duration_minutes: i32,
}

impl From<Row> for Film {
    fn from(row: Row) -> Self {
        Self {
            id: row.get(0),
            title: row.get(1),
            description: row.get(2),
            release_date: row.get(3),
            duration_minutes: row.get(4),
        }
    }
}

#[derive(Debug)]
pub struct FilmDataError {
    details: String,
}

impl FilmDataError {
    fn new(msg: &str) -> FilmDataError {
        FilmDataError { details: msg.to_string() }
    }
}

impl fmt::Display for FilmDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl error::Error for FilmDataError {}

impl Film {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn release_date(&self) -> &NaiveDate {
        &self.release_date
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn new(title: &str, description: &str, release_date: &str, duration_minutes: i32) -> Result<Film, FilmDataError> {
        if title.graphemes(true).count() == 0 {
            return Err(FilmDataError::new("title must not be empty"));
        }
        if duration_minutes <= 0 {
            return Err(FilmDataError::new("duration must be a positive number of minutes"));
        }
        Ok(Film {
            id: 0,
            title: if title.graphemes(true).count() <= 128 { title.to_string() } else { return Err(FilmDataError::new("title is too long")) },
            description: if description.graphemes(true).count() <= 2048 { description.to_string() } else { return Err(FilmDataError::new("description is too long")) },
            release_date: match NaiveDate::parse_from_str(release_date, "%Y-%m-%d") {
                Ok(release_date) => release_date,
                Err(e) => {
                    log::debug!("release_date format is incorrect: {:?}", e);
                    return Err(FilmDataError::new("release_date format is incorrect, should be %Y-%m-%d"))
                }
            },
            duration_minutes,
        })
    }

    pub fn with_id(&self, id: i64) -> Film {
        Film { id, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_film_is_accepted() {
        let film = Film::new("Solaris", "A psychologist is sent to a space station.", "1972-03-20", 167).unwrap();
        assert_eq!(0, film.id());
        assert_eq!("Solaris", film.title());
        assert_eq!(167, film.duration_minutes());
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(Film::new("", "x", "1972-03-20", 90).is_err());
    }

    #[test]
    fn overlong_description_is_rejected() {
        let description = "d".repeat(2049);
        assert!(Film::new("Solaris", &description, "1972-03-20", 90).is_err());
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(Film::new("Solaris", "x", "1972-03-20", 0).is_err());
        assert!(Film::new("Solaris", "x", "1972-03-20", -30).is_err());
    }

    #[test]
    fn malformed_release_date_is_rejected() {
        assert!(Film::new("Solaris", "x", "20.03.1972", 90).is_err());
    }
}
