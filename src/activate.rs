//! Environment-conditional source activation
//!
//! Source files may guard code with comment markers:
//!
//! ```text
//! /* +environment: development */
//! console.log('dev only');
//! /* -environment */
//! ```
//!
//! A block is kept (markers stripped) when its name equals the active
//! environment and removed wholesale otherwise. With no active environment
//! every guarded block is removed.

const START_MARKER: &str = "/* +environment:";
const END_MARKER: &str = "/* -environment */";

/// Apply environment activation to `source`.
pub fn activate_environment(source: &str, environment: Option<&str>) -> String {
    let mut result = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find(START_MARKER) {
        result.push_str(&rest[..start]);
        let after_marker = &rest[start + START_MARKER.len()..];

        let Some(name_end) = after_marker.find("*/") else {
            // Unterminated start marker: keep the remainder verbatim
            result.push_str(&rest[start..]);
            return result;
        };
        let name = after_marker[..name_end].trim();
        let body_start = name_end + 2;

        let (body, next) = match after_marker[body_start..].find(END_MARKER) {
            Some(end) => (
                &after_marker[body_start..body_start + end],
                &after_marker[body_start + end + END_MARKER.len()..],
            ),
            // Unterminated block runs to end of file
            None => (&after_marker[body_start..], ""),
        };

        if environment == Some(name) {
            result.push_str(body);
        }
        rest = next;
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "before\n/* +environment: development */\ndev();\n/* -environment */\nafter\n";

    #[test]
    fn matching_environment_keeps_block_without_markers() {
        let result = activate_environment(SOURCE, Some("development"));
        assert!(result.contains("dev();"));
        assert!(!result.contains("+environment"));
        assert!(!result.contains("-environment"));
        assert!(result.contains("before"));
        assert!(result.contains("after"));
    }

    #[test]
    fn other_environment_removes_block() {
        let result = activate_environment(SOURCE, Some("production"));
        assert!(!result.contains("dev();"));
        assert!(result.contains("before"));
        assert!(result.contains("after"));
    }

    #[test]
    fn no_environment_removes_all_blocks() {
        let result = activate_environment(SOURCE, None);
        assert!(!result.contains("dev();"));
    }

    #[test]
    fn multiple_blocks_are_handled_independently() {
        let source = "/* +environment: a */one/* -environment */ \
                      mid /* +environment: b */two/* -environment */";
        let result = activate_environment(source, Some("b"));
        assert!(!result.contains("one"));
        assert!(result.contains("two"));
        assert!(result.contains("mid"));
    }

    #[test]
    fn source_without_markers_is_untouched() {
        let source = "plain();\n";
        assert_eq!(activate_environment(source, Some("development")), source);
    }
}
