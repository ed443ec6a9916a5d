//! Parsing of raw identifiers received from callers.

use grouper_core::error::GrouperError;
use uuid::Uuid;

/// An id that doesn't parse can't name an existing group, so it is
/// reported exactly like a missing one.
pub(crate) fn parse_group_id(raw: &str) -> Result<Uuid, GrouperError> {
    Uuid::parse_str(raw.trim()).map_err(|_| GrouperError::NotFound {
        entity: "group".into(),
        id: raw.into(),
    })
}

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, GrouperError> {
    Uuid::parse_str(raw.trim()).map_err(|_| GrouperError::InvalidReference {
        entity: "user".into(),
        id: raw.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_group_id_is_not_found() {
        assert!(matches!(
            parse_group_id("666"),
            Err(GrouperError::NotFound { ref entity, .. }) if entity == "group"
        ));
    }

    #[test]
    fn unparsable_user_id_is_invalid_reference() {
        assert!(matches!(
            parse_user_id("rand"),
            Err(GrouperError::InvalidReference { ref entity, .. }) if entity == "user"
        ));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let id = Uuid::new_v4();
        assert_eq!(parse_group_id(&format!(" {id} ")).unwrap(), id);
    }
}
