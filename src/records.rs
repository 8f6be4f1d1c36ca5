//! Demo records and the store operations built on them.
//!
//! Records are assembled by position: column 0 maps to the first field,
//! column 1 to the second, and so on. Writes check the reply for engine
//! error text and surface it as [`CsqlError::Engine`].

use crate::client::CsqlClient;
use crate::decode::Value;
use crate::error::{CsqlError, Result};
use crate::statement::Statement;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A record that can be assembled from one decoded row.
pub trait FromRow: Sized {
    /// Record name used in diagnostics.
    const NAME: &'static str;

    /// Builds the record, or `None` if the row has the wrong shape.
    fn from_row(row: &[Value]) -> Option<Self>;
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl FromRow for User {
    const NAME: &'static str = "User";

    fn from_row(row: &[Value]) -> Option<Self> {
        match row {
            [Value::Int(id), Value::String(username), Value::String(email)] => Some(Self {
                id: *id,
                username: username.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

/// A row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub item: String,
}

impl FromRow for Order {
    const NAME: &'static str = "Order";

    fn from_row(row: &[Value]) -> Option<Self> {
        match row {
            [Value::Int(id), Value::Int(user_id), Value::String(item)] => Some(Self {
                id: *id,
                user_id: *user_id,
                item: item.clone(),
            }),
            _ => None,
        }
    }
}

/// One line of the users/orders join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOrder {
    pub username: String,
    pub order_item: String,
    pub order_id: i64,
}

impl FromRow for UserOrder {
    const NAME: &'static str = "UserOrder";

    fn from_row(row: &[Value]) -> Option<Self> {
        match row {
            [Value::String(username), Value::String(order_item), Value::Int(order_id)] => {
                Some(Self {
                    username: username.clone(),
                    order_item: order_item.clone(),
                    order_id: *order_id,
                })
            }
            _ => None,
        }
    }
}

// Store operations
impl CsqlClient {
    /// Sends a write and turns engine error text into `Err`.
    async fn write(&self, statement: Statement) -> Result<()> {
        let reply = self.execute_statement(&statement).await?;
        match crate::decode::engine_error(&reply) {
            Some(msg) => Err(CsqlError::engine(msg)),
            None => Ok(()),
        }
    }

    /// Lists every user. Rows that are not `(int, text, text)` are skipped.
    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.fetch_records(&Statement::SelectUsers.render()).await
    }

    /// Looks up one user by primary key.
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let users: Vec<User> = self
            .fetch_records(&Statement::SelectUserById(id).render())
            .await?;
        Ok(users.into_iter().next())
    }

    /// Looks up one user by email.
    ///
    /// An email containing `'` is refused before anything is sent.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let statement = Statement::SelectUserByEmail(email.to_string());
        if statement.has_quote_hazard() {
            return Err(CsqlError::query("email contains a single quote"));
        }
        let users: Vec<User> = self.fetch_records(&statement.render()).await?;
        Ok(users.into_iter().next())
    }

    /// Inserts a user. A duplicate id comes back as [`CsqlError::Engine`].
    pub async fn create_user(&self, user: &User) -> Result<()> {
        self.write(Statement::InsertUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        })
        .await?;
        info!("Created user {}", user.id);
        Ok(())
    }

    /// Overwrites username and email for `user.id`.
    pub async fn update_user(&self, user: &User) -> Result<()> {
        self.write(Statement::UpdateUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        })
        .await
    }

    /// Deletes the user with `id`.
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.write(Statement::DeleteUser(id)).await
    }

    /// Inserts an order for `order.user_id`.
    pub async fn create_order(&self, order: &Order) -> Result<()> {
        self.write(Statement::InsertOrder {
            id: order.id,
            user_id: order.user_id,
            item: order.item.clone(),
        })
        .await
    }

    /// Users joined with their orders, as `(username, item, order id)`.
    pub async fn get_user_orders(&self) -> Result<Vec<UserOrder>> {
        self.fetch_records(&Statement::SelectUserOrders.render())
            .await
    }
}
