use super::*;

/// Local user records.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Names are unique ignoring case: a second insert of
    /// the same name in any spelling fails with [`UserError::AlreadyExists`].
    async fn create(&self, user: &User) -> Result<(), UserError>;
    /// Finds a user by name, ignoring case.
    async fn lookup(&self, name: &str) -> Result<User, UserError>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use mb_core::Unique;
    use mb_pg::*;
    use tokio_postgres::Client;

    #[async_trait::async_trait]
    impl UserStore for Client {
        async fn create(&self, user: &User) -> Result<(), UserError> {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    USERS,
                    " (id, name, hash, email, class, admin, created, joined)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
                ),
                &[
                    &user.id().inner(),
                    &user.name(),
                    &user.hash(),
                    &user.email(),
                    &user.class(),
                    &user.admin(),
                    &user.created(),
                    &user.joined(),
                ],
            )
            .await
            .map(|_| ())
            .map_err(UserError::from)
        }

        async fn lookup(&self, name: &str) -> Result<User, UserError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT id, name, hash, email, class, admin, created, joined FROM ",
                    USERS,
                    " WHERE lower(name) = lower($1)"
                ),
                &[&name],
            )
            .await?
            .as_ref()
            .map(User::from)
            .ok_or(UserError::NotFound)
        }
    }

}
