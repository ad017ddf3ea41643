//! Activity log migrations - embedded SQL files
//!
//! Migrations are compiled into the binary at build time using include_str!.
//! Each migration is a tuple of (name, sql_content), applied in order.

/// All log migrations, embedded at compile time.
/// Format: (filename, sql_content)
///
/// When adding a new migration create `NNN_description.sql` next to this file
/// and append an entry here.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
    (
        "002_transaction_columns.sql",
        include_str!("002_transaction_columns.sql"),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<&str> = LOG_MIGRATIONS.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "000_migrations.sql");
    }
}
