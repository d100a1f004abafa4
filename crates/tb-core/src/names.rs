//! Name sanitising helpers shared by block and table naming

/// Characters stripped outright before sanitising
const STRIPPED_CHARS: [char; 5] = ['\u{feff}', '"', '\'', '\n', '\r'];

/// Sanitise a name into a lowercase identifier.
///
/// Strips quotes, BOMs and line breaks, replaces every character that is not
/// alphanumeric, `_`, or listed in `allow` with `_`, and prefixes names that
/// start with a digit with `number_`.
///
/// # Examples
/// ```
/// use tb_core::names::clean_name;
/// assert_eq!(clean_name("My Pipeline", &[]), "my_pipeline");
/// assert_eq!(clean_name("proj/models/users", &['/']), "proj/models/users");
/// assert_eq!(clean_name("1st-load", &[]), "number_1st_load");
/// ```
pub fn clean_name(name: &str, allow: &[char]) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();

    let cleaned: String = stripped
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || allow.contains(&c) {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("number_{}", cleaned)
    } else {
        cleaned
    }
}

/// Remove the final extension from a file name or path.
///
/// # Examples
/// ```
/// use tb_core::names::remove_extension;
/// assert_eq!(remove_extension("proj/models/users.sql"), "proj/models/users");
/// assert_eq!(remove_extension("users"), "users");
/// ```
pub fn remove_extension(path: &str) -> &str {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// Split a file name on its final dot into `(stem, extension)`.
///
/// Returns `None` when the name has no extension.
pub fn split_extension(filename: &str) -> Option<(&str, &str)> {
    filename.rsplit_once('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_strips_quotes_and_whitespace() {
        assert_eq!(clean_name("  'Orders' ", &[]), "orders");
        assert_eq!(clean_name("daily.load-v2", &[]), "daily_load_v2");
    }

    #[test]
    fn test_remove_extension_keeps_dotted_dirs() {
        assert_eq!(remove_extension("proj.v1/models/users"), "proj.v1/models/users");
        assert_eq!(remove_extension("a/b.tar.gz"), "a/b.tar");
    }

    #[test]
    fn test_split_extension_uses_final_dot() {
        assert_eq!(split_extension("users.v2.sql"), Some(("users.v2", "sql")));
        assert_eq!(split_extension("README"), None);
    }
}
