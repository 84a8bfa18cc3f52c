//! UUID utilities
//!
//! Every FATI table keys its rows by a textual UUIDv4 `guid`.

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a guid column value
pub fn parse(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Parse an optional guid column value
pub fn parse_opt(s: Option<String>) -> Result<Option<Uuid>> {
    s.as_deref().map(parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_generated() {
        let id = generate();
        assert_eq!(parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("not-a-uuid"), Err(Error::Internal(_))));
    }

    #[test]
    fn test_parse_opt_none() {
        assert_eq!(parse_opt(None).unwrap(), None);
    }
}
