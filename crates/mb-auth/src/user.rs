use super::*;
use mb_core::ID;
use mb_core::Unique;
use std::time::SystemTime;

/// Local account. Created once per identity, directly or by migration,
/// and never deleted by the auth core.
#[derive(Debug, Clone)]
pub struct User {
    id: ID<Self>,
    name: String,
    hash: String,
    email: String,
    class: String,
    admin: bool,
    created: SystemTime,
    joined: SystemTime,
}

impl User {
    /// New regular account joining now.
    pub fn new(name: String, hash: String, email: String) -> Self {
        let now = SystemTime::now();
        Self {
            id: ID::default(),
            name,
            hash,
            email,
            class: String::from("user"),
            admin: false,
            created: now,
            joined: now,
        }
    }
    /// Local copy of a legacy account, named as the legacy system spells it.
    /// Keeps the legacy join date when known.
    pub fn migrated(hash: String, profile: Profile) -> Self {
        let now = SystemTime::now();
        Self {
            id: ID::default(),
            name: profile.name,
            hash,
            email: profile.email,
            class: profile.class,
            admin: profile.admin,
            created: now,
            joined: profile.joined.unwrap_or(now),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Argon2 PHC string of the password.
    pub fn hash(&self) -> &str {
        &self.hash
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn class(&self) -> &str {
        &self.class
    }
    pub fn admin(&self) -> bool {
        self.admin
    }
    pub fn created(&self) -> SystemTime {
        self.created
    }
    pub fn joined(&self) -> SystemTime {
        self.joined
    }
}

impl Unique for User {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use mb_pg::*;

    impl From<&tokio_postgres::Row> for User {
        fn from(row: &tokio_postgres::Row) -> Self {
            Self {
                id: ID::from(row.get::<_, uuid::Uuid>("id")),
                name: row.get("name"),
                hash: row.get("hash"),
                email: row.get("email"),
                class: row.get("class"),
                admin: row.get("admin"),
                created: row.get("created"),
                joined: row.get("joined"),
            }
        }
    }

    /// Schema implementation for User (users table).
    impl Schema for User {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    name        VARCHAR(32) NOT NULL,
                    hash        TEXT NOT NULL,
                    email       VARCHAR(254) NOT NULL DEFAULT '',
                    class       VARCHAR(32) NOT NULL DEFAULT 'user',
                    admin       BOOLEAN NOT NULL DEFAULT FALSE,
                    created     TIMESTAMPTZ NOT NULL DEFAULT now(),
                    joined      TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        /// Names are unique regardless of case.
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_name ON ",
                USERS,
                " (lower(name));
                 CREATE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);"
            )
        }
    }
}
