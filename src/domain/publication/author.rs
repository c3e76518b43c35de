//! Author population at the data-access boundary.

use serde::Serialize;

use crate::domain::foundation::UserId;
use crate::domain::user::AuthorSummary;

/// Either a resolved author summary or a bare id when the author record
/// could not be loaded (deleted account, lookup skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Resolved(AuthorSummary),
    Reference { id: UserId },
}

impl AuthorRef {
    pub fn id(&self) -> &UserId {
        match self {
            AuthorRef::Resolved(summary) => &summary.id,
            AuthorRef::Reference { id } => id,
        }
    }

    /// Picks the matching summary from `known`, falling back to a reference.
    pub fn resolve(id: UserId, known: &[AuthorSummary]) -> Self {
        known
            .iter()
            .find(|summary| summary.id == id)
            .cloned()
            .map(AuthorRef::Resolved)
            .unwrap_or(AuthorRef::Reference { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_author() {
        let id = UserId::new();
        let known = vec![AuthorSummary {
            id,
            name: "Lin".into(),
            avatar: None,
        }];
        let author = AuthorRef::resolve(id, &known);
        assert!(matches!(author, AuthorRef::Resolved(ref s) if s.name == "Lin"));
        assert_eq!(author.id(), &id);
    }

    #[test]
    fn unknown_author_stays_a_reference() {
        let id = UserId::new();
        assert_eq!(AuthorRef::resolve(id, &[]), AuthorRef::Reference { id });
    }

    #[test]
    fn reference_serializes_as_id_object() {
        let id = UserId::new();
        let json = serde_json::to_value(AuthorRef::Reference { id }).unwrap();
        assert_eq!(json, serde_json::json!({ "id": id.to_string() }));
    }
}
