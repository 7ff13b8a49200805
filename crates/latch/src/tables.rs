use latch_sql::escape;

/// The table bindings supplied at adapter construction. Names are escaped
/// once, here; everything downstream treats them as opaque SQL text.
///
/// The session table is optional: without it, every session operation is a
/// no-op success and the store is never touched.
#[derive(Debug, Clone)]
pub struct TableSet {
    user: String,
    key: String,
    session: Option<String>,
}

impl TableSet {
    pub fn new(user: &str, key: &str) -> TableSet {
        TableSet {
            user: escape(user),
            key: escape(key),
            session: None,
        }
    }

    /// Binds the session table, enabling session operations.
    pub fn with_session(mut self, session: &str) -> TableSet {
        self.session = Some(escape(session));
        self
    }

    pub(crate) fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_escaped_once_at_construction() {
        let tables = TableSet::new("auth_user", "auth_key").with_session("auth_session");
        assert_eq!(tables.user(), "\"auth_user\"");
        assert_eq!(tables.key(), "\"auth_key\"");
        assert_eq!(tables.session(), Some("\"auth_session\""));
    }

    #[test]
    fn qualified_names_pass_through() {
        let tables = TableSet::new("auth.user", "auth.key");
        assert_eq!(tables.user(), "auth.user");
        assert_eq!(tables.session(), None);
    }
}
