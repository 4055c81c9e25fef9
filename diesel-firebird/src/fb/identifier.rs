//! Identifier case folding and quoting
//!
//! Firebird stores unquoted names upper-cased in the catalog, while diesel
//! schemas conventionally use lowercase names. The two pure functions here
//! reconcile the conventions: [`normalize_name`] folds catalog names to the
//! lowercase convention on the way out of the server, [`denormalize_name`]
//! restores the server convention on the way in. Names that were created
//! quoted (mixed case, reserved words, exotic characters) are preserved
//! exactly in both directions.

/// Words that need quoting when used as a bare identifier.
///
/// Sorted, lowercase; membership is checked case-insensitively via binary
/// search.
pub const RESERVED_WORDS: &[&str] = &[
    "action", "active", "add", "admin", "after", "all", "alter", "and",
    "any", "as", "asc", "ascending", "at", "auto", "autoddl", "avg",
    "base_name", "based", "basename", "before", "begin", "between", "bigint",
    "blob", "blobedit", "buffer", "by", "cache", "cascade", "case", "cast",
    "char", "char_length", "character", "character_length", "check",
    "check_point_len", "check_point_length", "close", "collate", "collation",
    "column", "commit", "committed", "compiletime", "computed",
    "conditional", "connect", "constraint", "containing", "continue",
    "count", "create", "cstring", "current", "current_connection",
    "current_date", "current_role", "current_time", "current_timestamp",
    "current_transaction", "current_user", "cursor", "database", "date",
    "day", "db_key", "debug", "dec", "decimal", "declare", "default",
    "delete", "desc", "descending", "describe", "descriptor", "disconnect",
    "display", "distinct", "do", "domain", "double", "drop", "echo", "edit",
    "else", "end", "entry_point", "escape", "event", "exception", "execute",
    "exists", "exit", "extern", "external", "extract", "fetch", "file",
    "filter", "float", "for", "foreign", "found", "free_it", "from", "full",
    "function", "gdscode", "gen_id", "generator", "global", "goto", "grant",
    "group", "group_commit_", "group_commit_wait", "having", "help", "hour",
    "if", "immediate", "in", "inactive", "index", "indicator", "init",
    "inner", "input", "input_type", "insert", "int", "integer", "into", "is",
    "isolation", "isql", "join", "key", "lc_messages", "lc_type", "left",
    "length", "lev", "level", "like", "log_buf_size", "log_buffer_size",
    "logfile", "long", "manual", "max", "max_segment", "maximum",
    "maximum_segment", "merge", "message", "min", "minimum", "minute",
    "module_name", "month", "names", "national", "natural", "nchar", "no",
    "noauto", "not", "null", "num_log_buffers", "num_log_bufs", "numeric",
    "octet_length", "of", "on", "only", "open", "option", "or", "order",
    "outer", "output", "output_type", "overflow", "page", "page_size",
    "pagelength", "pages", "parameter", "password", "plan", "position",
    "post_event", "precision", "prepare", "primary", "privileges",
    "procedure", "protected", "public", "quit", "raw_partitions",
    "rdb$db_key", "read", "real", "record_version", "recreate", "references",
    "release", "reserv", "reserving", "restrict", "retain", "return",
    "returning_values", "returns", "revoke", "right", "role", "rollback",
    "row_count", "runtime", "savepoint", "schema", "second", "segment",
    "select", "set", "shadow", "shared", "shell", "show", "singular", "size",
    "smallint", "snapshot", "some", "sort", "sqlcode", "sqlerror",
    "sqlwarning", "stability", "starting", "starts", "statement", "static",
    "statistics", "sub_type", "sum", "suspend", "table", "terminator",
    "then", "time", "timestamp", "to", "transaction", "translate",
    "translation", "trigger", "trim", "type", "uncommitted", "union",
    "unique", "update", "upper", "user", "using", "value", "values",
    "varchar", "variable", "varying", "version", "view", "wait", "wait_time",
    "weekday", "when", "whenever", "where", "while", "with", "work", "write",
    "year", "yearday",
];

/// Whether `word` is a reserved word, ignoring case.
pub fn is_reserved(word: &str) -> bool {
    let lowered = word.to_lowercase();
    RESERVED_WORDS.binary_search(&lowered.as_str()).is_ok()
}

/// Whether `name` can be written bare (unquoted) without changing meaning:
/// starts with a letter and contains only `[a-zA-Z0-9_$]`.
fn is_legal_bare(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` must be quoted when emitted into SQL.
///
/// True for reserved words, names with characters outside the bare-identifier
/// syntax, and names carrying non-lowercase characters (those were created
/// quoted, or are catalog names whose exact case must survive).
pub fn requires_quotes(name: &str) -> bool {
    let lowered = name.to_lowercase();
    lowered != name
        || RESERVED_WORDS.binary_search(&lowered.as_str()).is_ok()
        || !is_legal_bare(&lowered)
}

/// Fold a name read from the catalog into the portable convention.
///
/// Trailing pad spaces are removed first (catalog name columns are
/// fixed-length `CHAR`s). An all-uppercase name that would not need quoting
/// in lowercase was stored by an unquoted identifier, so it folds to
/// lowercase; anything else was explicitly quoted and is preserved. Empty
/// input yields `None`.
pub fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim_end_matches(' ');
    if name.is_empty() {
        return None;
    }
    if name.to_uppercase() == name && !requires_quotes(&name.to_lowercase()) {
        Some(name.to_lowercase())
    } else {
        Some(name.to_owned())
    }
}

/// Inverse of [`normalize_name`]: prepare a portable name for the server.
///
/// An all-lowercase name that needs no quoting is upper-cased (it will be
/// emitted bare and the server folds it anyway); anything else is preserved,
/// since changing its case would change which catalog entry it refers to.
/// Empty input yields `None`.
pub fn denormalize_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    if name.to_lowercase() == name && !requires_quotes(name) {
        Some(name.to_uppercase())
    } else {
        Some(name.to_owned())
    }
}
