const ESCAPE_CHAR: char = '"';

/// Escapes a table or column name, unless it is already schema-qualified
/// (contains a `.`), in which case it is passed through unchanged.
///
/// This is a syntactic safeguard against reserved words and case folding,
/// not an injection defense; argument values always go through parameter
/// binding.
pub fn escape(name: &str) -> String {
    if name.contains('.') {
        return name.to_string();
    }
    format!("{ESCAPE_CHAR}{name}{ESCAPE_CHAR}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_plain_names() {
        assert_eq!(escape("auth_user"), "\"auth_user\"");
        assert_eq!(escape("user"), "\"user\"");
    }

    #[test]
    fn passes_qualified_names_through() {
        assert_eq!(escape("auth.user"), "auth.user");
        assert_eq!(escape("\"auth\".\"user\""), "\"auth\".\"user\"");
    }

    #[test]
    fn re_escaping_is_not_idempotent() {
        // A plain name picks up another layer of quoting each time.
        let once = escape("auth_user");
        assert_ne!(escape(&once), once);

        // A qualified name is stable.
        let qualified = escape("auth.user");
        assert_eq!(escape(&qualified), qualified);
    }
}
