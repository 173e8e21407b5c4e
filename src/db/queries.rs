//! SQL query constants
//!
//! Contains all SQL statements used by the application. Every statement is
//! parameterized; no user input is ever interpolated into SQL text.

/// Table bootstrap, safe to run on every start
pub const CREATE_CONTACT_MESSAGES: &str = r#"
    CREATE TABLE IF NOT EXISTS contact_messages (
        id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        message TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        status TEXT NOT NULL DEFAULT 'new',
        ip_address TEXT,
        user_agent TEXT
    )
"#;

pub const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_contact_messages_email ON contact_messages(email)",
    "CREATE INDEX IF NOT EXISTS idx_contact_messages_created_at ON contact_messages(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_contact_messages_status ON contact_messages(status)",
];

/// $1 name, $2 email, $3 phone, $4 message, $5 status, $6 ip_address, $7 user_agent
pub const INSERT_MESSAGE: &str = r#"
    INSERT INTO contact_messages (name, email, phone, message, status, ip_address, user_agent)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id
"#;

/// $1 limit. ip_address and user_agent are never selected here.
pub const LIST_RECENT_MESSAGES: &str = r#"
    SELECT id, name, email, phone, message, created_at, status
    FROM contact_messages
    ORDER BY created_at DESC
    LIMIT $1
"#;

/// $1 id, $2 new status, $3 statuses the new status cannot be reached from
pub const UPDATE_MESSAGE_STATUS: &str = r#"
    UPDATE contact_messages
    SET status = $2
    WHERE id = $1
        AND NOT (status = ANY($3))
"#;

/// Only issued after an update touched zero rows
pub const GET_MESSAGE_STATUS: &str = r#"
    SELECT status FROM contact_messages WHERE id = $1
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_never_exposes_request_metadata() {
        assert!(!LIST_RECENT_MESSAGES.contains("ip_address"));
        assert!(!LIST_RECENT_MESSAGES.contains("user_agent"));
        assert!(LIST_RECENT_MESSAGES.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn update_touches_status_only() {
        let set_clause = UPDATE_MESSAGE_STATUS
            .split("SET")
            .nth(1)
            .and_then(|rest| rest.split("WHERE").next())
            .unwrap();
        assert_eq!(set_clause.trim(), "status = $2");
    }
}
