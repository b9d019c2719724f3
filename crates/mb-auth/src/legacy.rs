use super::*;
use std::time::SystemTime;

/// Account details carried over from the legacy system on migration.
/// `name` is the account name as the legacy system spells it.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub class: String,
    pub admin: bool,
    pub joined: Option<SystemTime>,
}

/// Read-only access to the legacy credential store.
///
/// Only consulted for users that have no local record yet.
#[async_trait::async_trait]
pub trait Legacy: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<(), LegacyError>;
    async fn profile(&self, username: &str) -> Result<Profile, LegacyError>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use tokio::task::JoinHandle;
    use tokio_postgres::Client;

    const LEGACY_USERS: &str = "users";

    /// Legacy verifier over the old user table. Passwords are stored as
    /// `md5(lower(name) || password)` and compared inside the database.
    pub struct PgLegacy {
        client: Client,
        connection: JoinHandle<()>,
    }

    impl PgLegacy {
        pub async fn open(url: &str) -> Result<Self, LegacyError> {
            let (client, connection) = mb_pg::connect(url).await?;
            Ok(Self { client, connection })
        }
    }

    impl Drop for PgLegacy {
        fn drop(&mut self) {
            self.connection.abort();
        }
    }

    #[async_trait::async_trait]
    impl Legacy for PgLegacy {
        async fn verify(&self, username: &str, password: &str) -> Result<(), LegacyError> {
            let row = self
                .client
                .query_opt(
                    const_format::concatcp!(
                        "SELECT pass = md5(lower(name) || $2) FROM ",
                        LEGACY_USERS,
                        " WHERE lower(name) = lower($1)"
                    ),
                    &[&username, &password],
                )
                .await?
                .ok_or(LegacyError::NotFound)?;
            match row.get::<_, Option<bool>>(0) {
                Some(true) => Ok(()),
                _ => Err(LegacyError::WrongCredentials),
            }
        }

        async fn profile(&self, username: &str) -> Result<Profile, LegacyError> {
            self.client
                .query_opt(
                    const_format::concatcp!(
                        "SELECT name,
                                COALESCE(email, ''),
                                COALESCE(class, 'user'),
                                COALESCE(admin = 'Y', FALSE),
                                joindate::TIMESTAMPTZ
                         FROM ",
                        LEGACY_USERS,
                        " WHERE lower(name) = lower($1)"
                    ),
                    &[&username],
                )
                .await?
                .map(|row| Profile {
                    name: row.get(0),
                    email: row.get(1),
                    class: row.get(2),
                    admin: row.get(3),
                    joined: row.get(4),
                })
                .ok_or(LegacyError::NotFound)
        }
    }
}
#[cfg(feature = "database")]
pub use postgres::*;
