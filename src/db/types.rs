use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Teacher,
    Student,
    Admin,
}

impl UserRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// Which question bank a question id refers to. Stored as plain TEXT via
/// [`QuestionKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum QuestionKind {
    Subjective,
    Mcq,
    Diagram,
}

impl QuestionKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Subjective => "subjective",
            Self::Mcq => "mcq",
            Self::Diagram => "diagram",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "subjective" => Ok(Self::Subjective),
            "mcq" | "mcqs" | "objective" => Ok(Self::Mcq),
            "diagram" | "diagrams" => Ok(Self::Diagram),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_accepts_plural_aliases() {
        assert_eq!("MCQs".parse::<QuestionKind>(), Ok(QuestionKind::Mcq));
        assert_eq!("diagrams".parse::<QuestionKind>(), Ok(QuestionKind::Diagram));
        assert_eq!("subjective".parse::<QuestionKind>(), Ok(QuestionKind::Subjective));
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn user_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Teacher).unwrap(), "\"teacher\"");
        assert_eq!("Admin".parse::<UserRole>(), Ok(UserRole::Admin));
    }
}
