use std::error;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: i64,
    name: String,
    email: String,
    birthdate: NaiveDate,
}

impl From<Row> for User {
    fn from(row: Row) -> Self {
        Self {
            id: row.get(0),
            name: row.get(1),
            email: row.get(2),
            birthdate: row.get(3),
        }
    }
}

#[derive(Debug)]
pub struct UserDataError {
    details: String,
}

impl UserDataError {
    fn new(msg: &str) -> UserDataError {
        UserDataError { details: msg.to_string() }
    }
}

impl fmt::Display for UserDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl error::Error for UserDataError {}

impl User {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn birthdate(&self) -> &NaiveDate {
        &self.birthdate
    }

    // The id stays 0 until a storage backend assigns the real one.
    pub fn new(name: &str, email: &str, birthdate: &str) -> Result<User, UserDataError> {
        if name.graphemes(true).count() == 0 {
            return Err(UserDataError::new("name must not be empty"));
        }
        if !email.contains('@') {
            return Err(UserDataError::new("email must contain the @ sign"));
        }
        Ok(User {
            id: 0,
            name: if name.graphemes(true).count() <= 64 { name.to_string() } else { return Err(UserDataError::new("name is too long")) },
            email: if email.graphemes(true).count() <= 128 { email.to_string() } else { return Err(UserDataError::new("email is too long")) },
            birthdate: match NaiveDate::parse_from_str(birthdate, "%Y-%m-%d") {
                Ok(birthdate) => birthdate,
                Err(e) => {
                    log::debug!("birthdate format is incorrect: {:?}", e);
                    return Err(UserDataError::new("birthdate format is incorrect, should be %Y-%m-%d"))
                }
            },
        })
    }

    pub fn with_id(&self, id: i64) -> User {
        User { id, ..self.clone() }
    }
}
