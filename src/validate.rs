//! Shared input validation, used by every surface (gateway, REST, demo
//! client) so the rules live in exactly one place.
//!
//! Error display strings are the exact messages shown to users; there are
//! no machine-readable codes anywhere in this system.

use thiserror::Error;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const ROOM_NAME_MIN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a username")]
    UsernameEmpty,
    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,
    #[error("Username must be less than 20 characters")]
    UsernameTooLong,
    #[error("Username can only contain letters, numbers, underscores, and hyphens")]
    UsernameBadCharacters,
    #[error("Please enter a room name")]
    RoomNameEmpty,
    #[error("Room name must be at least 3 characters long")]
    RoomNameTooShort,
    #[error("Please enter a message")]
    MessageEmpty,
}

pub fn username(input: &str) -> Result<&str, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if name.len() < USERNAME_MIN {
        return Err(ValidationError::UsernameTooShort);
    }
    if name.len() > USERNAME_MAX {
        return Err(ValidationError::UsernameTooLong);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ValidationError::UsernameBadCharacters);
    }
    Ok(name)
}

pub fn room_name(input: &str) -> Result<&str, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::RoomNameEmpty);
    }
    if name.len() < ROOM_NAME_MIN {
        return Err(ValidationError::RoomNameTooShort);
    }
    Ok(name)
}

pub fn message_content(input: &str) -> Result<&str, ValidationError> {
    let content = input.trim();
    if content.is_empty() {
        return Err(ValidationError::MessageEmpty);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_usernames_in_bounds() {
        assert_eq!(username("alice"), Ok("alice"));
        assert_eq!(username("  alice  "), Ok("alice"));
        assert_eq!(username("a_b-c42"), Ok("a_b-c42"));
        assert_eq!(username("abc"), Ok("abc"));
        assert_eq!(username(&"x".repeat(20)).is_ok(), true);
    }

    #[test]
    fn rejects_bad_usernames() {
        assert_eq!(username(""), Err(ValidationError::UsernameEmpty));
        assert_eq!(username("   "), Err(ValidationError::UsernameEmpty));
        assert_eq!(username("ab"), Err(ValidationError::UsernameTooShort));
        assert_eq!(
            username(&"x".repeat(21)),
            Err(ValidationError::UsernameTooLong)
        );
        assert_eq!(
            username("has space"),
            Err(ValidationError::UsernameBadCharacters)
        );
        assert_eq!(
            username("émile"),
            Err(ValidationError::UsernameBadCharacters)
        );
    }

    #[test]
    fn room_and_message_rules() {
        assert_eq!(room_name("Tech Talk"), Ok("Tech Talk"));
        assert_eq!(room_name("  "), Err(ValidationError::RoomNameEmpty));
        assert_eq!(room_name("ab"), Err(ValidationError::RoomNameTooShort));
        assert_eq!(message_content(" hi "), Ok("hi"));
        assert_eq!(message_content("\n"), Err(ValidationError::MessageEmpty));
    }

    #[test]
    fn error_strings_are_the_ui_strings() {
        assert_eq!(
            ValidationError::UsernameTooShort.to_string(),
            "Username must be at least 3 characters long"
        );
        assert_eq!(
            ValidationError::UsernameBadCharacters.to_string(),
            "Username can only contain letters, numbers, underscores, and hyphens"
        );
    }
}
