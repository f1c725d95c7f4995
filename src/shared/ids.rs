use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

define_id_type!(OwnerId, "owner id");
define_id_type!(ThreadId, "thread id");
define_id_type!(TicketId, "ticket id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_dash_underscore() {
        assert!(OwnerId::parse("user-42_a").is_ok());
        assert!(ThreadId::parse("thread_0001").is_ok());
        assert!(TicketId::parse("T-9").is_ok());
    }

    #[test]
    fn rejects_empty_and_separator_characters() {
        assert!(OwnerId::parse("").is_err());
        assert!(ThreadId::parse("a/b").is_err());
        assert!(TicketId::parse("t..x").is_err());
        assert!(OwnerId::parse("space name").is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let ok: Result<ThreadId, _> = serde_yaml::from_str("thread-1");
        assert_eq!(ok.expect("valid id").as_str(), "thread-1");

        let err: Result<ThreadId, _> = serde_yaml::from_str("\"bad/id\"");
        assert!(err.is_err());
    }
}
