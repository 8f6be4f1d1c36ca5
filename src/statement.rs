//! Statement construction.
//!
//! Every statement the crate sends is rendered here. The engine has no
//! parameter protocol, so values are interpolated straight into the text
//! with no escaping: a text value containing `'` changes the statement.
//! [`Statement::has_quote_hazard`] reports that case so callers can refuse
//! it. Replacing this module is all it takes to change how text is produced;
//! the transport and decoder only ever see the rendered string.

use std::fmt;

/// A statement the client knows how to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateUsersTable,
    CreateOrdersTable,
    CreateOrdersUserIndex,
    InsertUser {
        id: i64,
        username: String,
        email: String,
    },
    SelectUsers,
    SelectUserById(i64),
    SelectUserByEmail(String),
    UpdateUser {
        id: i64,
        username: String,
        email: String,
    },
    DeleteUser(i64),
    InsertOrder {
        id: i64,
        user_id: i64,
        item: String,
    },
    SelectUserOrders,
}

impl Statement {
    /// Renders the statement text.
    pub fn render(&self) -> String {
        match self {
            Self::CreateUsersTable => {
                "CREATE TABLE users (id int PRIMARY KEY, username text, email text);".to_string()
            }
            Self::CreateOrdersTable => {
                "CREATE TABLE orders (id int PRIMARY KEY, user_id int, item text);".to_string()
            }
            Self::CreateOrdersUserIndex => "CREATE INDEX idx_orders_user ON orders(user_id);".to_string(),
            Self::InsertUser {
                id,
                username,
                email,
            } => format!("INSERT INTO users VALUES ({id}, '{username}', '{email}');"),
            Self::SelectUsers => "SELECT * FROM users;".to_string(),
            Self::SelectUserById(id) => format!("SELECT * FROM users WHERE id={id};"),
            Self::SelectUserByEmail(email) => format!("SELECT * FROM users WHERE email='{email}';"),
            Self::UpdateUser {
                id,
                username,
                email,
            } => format!("UPDATE users SET username='{username}', email='{email}' WHERE id={id};"),
            Self::DeleteUser(id) => format!("DELETE FROM users WHERE id={id};"),
            Self::InsertOrder { id, user_id, item } => {
                format!("INSERT INTO orders VALUES ({id}, {user_id}, '{item}');")
            }
            Self::SelectUserOrders => "SELECT users.username, orders.item, orders.id FROM users JOIN orders ON users.id=orders.user_id;".to_string(),
        }
    }

    /// Text values that end up between single quotes.
    fn quoted_values(&self) -> Vec<&str> {
        match self {
            Self::InsertUser {
                username, email, ..
            }
            | Self::UpdateUser {
                username, email, ..
            } => vec![username.as_str(), email.as_str()],
            Self::SelectUserByEmail(email) => vec![email.as_str()],
            Self::InsertOrder { item, .. } => vec![item.as_str()],
            _ => Vec::new(),
        }
    }

    /// Returns true if an interpolated text value would break out of its quotes.
    pub fn has_quote_hazard(&self) -> bool {
        self.quoted_values().iter().any(|v| v.contains('\''))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_user() {
        let stmt = Statement::InsertUser {
            id: 101,
            username: "Mwaura Mbugua".into(),
            email: "mwaurambugua12@gmail.com".into(),
        };
        assert_eq!(
            stmt.render(),
            "INSERT INTO users VALUES (101, 'Mwaura Mbugua', 'mwaurambugua12@gmail.com');"
        );
        assert!(!stmt.has_quote_hazard());
    }

    #[test]
    fn test_update_and_delete() {
        let update = Statement::UpdateUser {
            id: 3,
            username: "bob".into(),
            email: "bob@x.io".into(),
        };
        assert_eq!(
            update.to_string(),
            "UPDATE users SET username='bob', email='bob@x.io' WHERE id=3;"
        );
        assert_eq!(
            Statement::DeleteUser(3).render(),
            "DELETE FROM users WHERE id=3;"
        );
    }

    #[test]
    fn test_insert_order() {
        let stmt = Statement::InsertOrder {
            id: 501,
            user_id: 101,
            item: "Keyboard".into(),
        };
        assert_eq!(
            stmt.render(),
            "INSERT INTO orders VALUES (501, 101, 'Keyboard');"
        );
    }

    #[test]
    fn test_quote_hazard_detected() {
        let stmt = Statement::SelectUserByEmail("x' OR '1'='1".into());
        assert!(stmt.has_quote_hazard());
        assert_eq!(
            stmt.render(),
            "SELECT * FROM users WHERE email='x' OR '1'='1';"
        );
    }
}
