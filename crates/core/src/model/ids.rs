use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an identifier is blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} cannot be empty")]
pub struct ParseIdError {
    kind: &'static str,
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "` from a non-blank string.")]
            ///
            /// # Errors
            ///
            /// Returns `ParseIdError` if the value is empty after trimming.
            pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
                let raw = id.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // Lets maps keyed by the id be queried with a plain `&str`.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id! {
    /// Identifier of a course, e.g. `html`.
    CourseId
}

string_id! {
    /// Identifier of a module within a course, e.g. `html-1`.
    ModuleId
}

string_id! {
    /// Identifier of a quiz attached to a module.
    QuizId
}

string_id! {
    /// Identifier of a question, unique within its quiz.
    QuestionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_trims_and_displays() {
        let id = CourseId::new("  html ").unwrap();
        assert_eq!(id.to_string(), "html");
        assert_eq!(id, "html");
    }

    #[test]
    fn blank_ids_are_rejected() {
        let err = ModuleId::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "ModuleId cannot be empty");
        assert!("".parse::<QuizId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = QuestionId::new("q1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"q1\"");

        let parsed: QuestionId = serde_json::from_str("\"q2\"").unwrap();
        assert_eq!(parsed.as_str(), "q2");
        assert!(serde_json::from_str::<QuestionId>("\"\"").is_err());
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(CourseId::new("css").unwrap(), 3_u32);
        assert_eq!(map.get("css"), Some(&3));
    }
}
