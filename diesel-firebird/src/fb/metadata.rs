//! Server capabilities and grammar detection

use rsfbclient::{Queryable, SimpleConnection as FbRawConnection};

/// The SQL grammar variant spoken by the server.
///
/// Firebird inherited two SQL "dialects" from Interbase: dialect 1 (the
/// legacy grammar: `GENERATOR` objects, `strlen`, no `AS` keyword for
/// aliases) and dialect 3 (the current grammar, introduced with Interbase
/// 6.0). Which one applies is decided once per connection from the server
/// version.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum SqlGrammar {
    /// Pre-2.0 servers: `GENERATOR`, `strlen`, aliases without `AS`.
    Legacy,
    /// The grammar of every supported modern server.
    #[default]
    Current,
}

/// Capabilities of one connected server, fixed after the version probe.
///
/// Construction is two-phase: the connection runs the probe first and only
/// then builds this record; nothing mutates it afterwards, so sharing the
/// owning connection across its lifetime never observes a capability change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FbDialectInfo {
    server_version: (u32, u32),
    grammar: SqlGrammar,
}

/// `RDB$GET_CONTEXT` is available since Firebird 2.1; older servers fail the
/// probe and are treated as legacy-grammar.
const ENGINE_VERSION_QUERY: &str =
    "SELECT RDB$GET_CONTEXT('SYSTEM', 'ENGINE_VERSION') FROM RDB$DATABASE";

impl FbDialectInfo {
    /// Build the capability record for a server reporting this version.
    pub fn new(server_version: (u32, u32)) -> Self {
        let grammar = if server_version.0 < 2 {
            SqlGrammar::Legacy
        } else {
            SqlGrammar::Current
        };
        FbDialectInfo {
            server_version,
            grammar,
        }
    }

    /// Build the record from a raw version string.
    ///
    /// Accepts both the bare `ENGINE_VERSION` form (`"3.0.10"`) and banner
    /// forms such as `"WI-V6.3.2.4731 Firebird 2.5"`, taking the first
    /// dotted number group. Unparseable strings fall back to legacy.
    pub fn from_version_string(version: &str) -> Self {
        Self::new(parse_version(version).unwrap_or((1, 0)))
    }

    /// The record used when the server cannot answer the version probe.
    pub fn legacy_fallback() -> Self {
        Self::new((1, 0))
    }

    /// `(major, minor)` of the connected server.
    pub fn server_version(&self) -> (u32, u32) {
        self.server_version
    }

    /// The grammar every statement for this connection is generated in.
    pub fn grammar(&self) -> SqlGrammar {
        self.grammar
    }

    /// Firebird truncates identifiers beyond 31 characters.
    pub fn max_identifier_length(&self) -> usize {
        31
    }

    /// Sequences (generators) are available on every supported version.
    pub fn supports_sequences(&self) -> bool {
        true
    }

    /// There is no native autoincrement; the generator-plus-trigger pattern
    /// stands in for it (see [`super::reflection::column_sequence`]).
    pub fn supports_pk_autoincrement(&self) -> bool {
        false
    }

    /// Unquoted names live upper-cased in the catalog and need folding, see
    /// [`super::identifier`].
    pub fn requires_name_normalization(&self) -> bool {
        true
    }
}

/// Probe the server once and freeze the result.
pub(crate) fn detect(raw: &mut FbRawConnection) -> FbDialectInfo {
    match raw.query::<(), (Option<String>,)>(ENGINE_VERSION_QUERY, ()) {
        Ok(rows) => match rows.into_iter().next().and_then(|row| row.0) {
            Some(version) => FbDialectInfo::from_version_string(&version),
            None => FbDialectInfo::legacy_fallback(),
        },
        Err(_) => FbDialectInfo::legacy_fallback(),
    }
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let start = version.find(|c: char| c.is_ascii_digit())?;
    let digits = &version[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(digits.len());
    let mut parts = digits[..end].split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_version_strings_parse() {
        assert_eq!(parse_version("3.0.10"), Some((3, 0)));
        assert_eq!(parse_version("2.5"), Some((2, 5)));
        assert_eq!(parse_version("WI-V6.3.2.4731 Firebird 2.5"), Some((6, 3)));
        assert_eq!(parse_version("4"), Some((4, 0)));
        assert_eq!(parse_version("garbage"), None);
    }

    #[test]
    fn old_majors_select_the_legacy_grammar() {
        let info = FbDialectInfo::from_version_string("1.5.6");
        assert_eq!(info.grammar(), SqlGrammar::Legacy);
        assert_eq!(info.server_version(), (1, 5));
    }

    #[test]
    fn modern_majors_select_the_current_grammar() {
        let info = FbDialectInfo::from_version_string("3.0.10");
        assert_eq!(info.grammar(), SqlGrammar::Current);

        let info = FbDialectInfo::from_version_string("2.0.7");
        assert_eq!(info.grammar(), SqlGrammar::Current);
    }

    #[test]
    fn unparseable_versions_fall_back_to_legacy() {
        let info = FbDialectInfo::from_version_string("");
        assert_eq!(info.grammar(), SqlGrammar::Legacy);
    }

    #[test]
    fn static_capabilities() {
        let info = FbDialectInfo::new((3, 0));
        assert_eq!(info.max_identifier_length(), 31);
        assert!(info.supports_sequences());
        assert!(!info.supports_pk_autoincrement());
        assert!(info.requires_name_normalization());
    }
}
