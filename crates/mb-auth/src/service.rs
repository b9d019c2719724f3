use super::*;
use std::sync::Arc;

/// Login and refresh orchestration.
///
/// Holds no mutable state of its own; every effect goes through the injected
/// user store, legacy verifier, and whitelist. Share it behind an `Arc`.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    legacy: Arc<dyn Legacy>,
    whitelist: Arc<dyn Whitelist>,
    crypto: Crypto,
    config: Config,
}

impl AuthService {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        legacy: Arc<dyn Legacy>,
        whitelist: Arc<dyn Whitelist>,
    ) -> Self {
        Self {
            crypto: Crypto::new(config.secret()),
            users,
            legacy,
            whitelist,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Exchanges credentials for a grant, migrating the user from the legacy
    /// system on first sight.
    pub async fn login(&self, username: &str, password: &str) -> Result<Grant, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::WrongCredentials);
        }
        let user = match self.users.lookup(username).await {
            Ok(user) => user,
            Err(UserError::NotFound) => self.migrate(username, password).await?,
            Err(e) => return Err(AuthError::internal("error looking up user", e)),
        };
        match password::check(password, user.hash()).await? {
            true => self.grant(None).await,
            false => Err(AuthError::WrongCredentials),
        }
    }

    /// Exchanges a whitelisted refresh token for a new grant.
    pub async fn refresh(&self, refresh: &str) -> Result<Grant, AuthError> {
        if refresh.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let token = match self.crypto.decode(refresh) {
            Ok(token) => token,
            Err(TokenError::Invalid) => return Err(AuthError::InvalidToken),
            Err(e) => return Err(AuthError::internal("error decoding refresh token", e)),
        };
        if token.id().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let stored = match self.whitelist.get(token.id()).await {
            Ok(stored) => stored,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
            Err(e) => return Err(AuthError::internal("error reading whitelist", e)),
        };
        if !self.admissible(&token, &stored) {
            return Err(AuthError::InvalidToken);
        }
        match self.config.is_single_use() {
            true => self.grant(Some(token.id())).await,
            false => self.grant(None).await,
        }
    }

    /// Copies a legacy user into the local store after the legacy system
    /// accepts the credentials. Losing a concurrent migration is fine: the
    /// winner's record is returned.
    async fn migrate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        match self.legacy.verify(username, password).await {
            Ok(()) => {}
            Err(LegacyError::NotFound | LegacyError::WrongCredentials) => {
                return Err(AuthError::WrongCredentials);
            }
            Err(e) => return Err(AuthError::internal("error verifying legacy user", e)),
        }
        let profile = self
            .legacy
            .profile(username)
            .await
            .map_err(|e| AuthError::internal("error fetching legacy profile", e))?;
        let hash = password::digest(password).await?;
        let user = User::migrated(hash, profile);
        match self.users.create(&user).await {
            Ok(()) => {
                log::info!("migrated legacy user {}", user.name());
                Ok(user)
            }
            Err(UserError::AlreadyExists) => {
                log::debug!("legacy user {} migrated concurrently", username);
                self.users
                    .lookup(username)
                    .await
                    .map_err(|e| AuthError::internal("error looking up migrated user", e))
            }
            Err(e) => Err(AuthError::internal("error creating user", e)),
        }
    }

    /// Signs a fresh access/refresh pair and whitelists the refresh token,
    /// replacing `replaces` atomically when given.
    async fn grant(&self, replaces: Option<&str>) -> Result<Grant, AuthError> {
        let issued = mb_core::now();
        let issuer = self.config.issuer();
        let subject = mb_core::identifier();
        let csrf = Crypto::csrf();
        let access = Token::new(issuer, &subject, &csrf, issued, self.config.access());
        let refresh = Token::new(issuer, &subject, &csrf, issued, self.config.refresh())
            .identified(mb_core::identifier());
        let grant = Grant {
            access: self
                .crypto
                .encode(&access)
                .map_err(|e| AuthError::internal("error signing access token", e))?,
            refresh: self
                .crypto
                .encode(&refresh)
                .map_err(|e| AuthError::internal("error signing refresh token", e))?,
        };
        match replaces {
            None => self
                .whitelist
                .put(refresh.id(), &refresh)
                .await
                .map_err(|e| AuthError::internal("error whitelisting refresh token", e))?,
            Some(old) => match self.whitelist.rotate(old, refresh.id(), &refresh).await {
                Ok(()) => {}
                Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
                Err(e) => return Err(AuthError::internal("error rotating refresh token", e)),
            },
        }
        Ok(grant)
    }

    fn admissible(&self, token: &Token, stored: &Token) -> bool {
        token.issuer() == self.config.issuer()
            && token.duration() == self.config.refresh()
            && token.matches(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use std::time::Duration;

    const SECRET: &[u8] = b"a secret for tests";
    const ACCESS: Duration = Duration::from_secs(15 * 60);
    const REFRESH: Duration = Duration::from_secs(72 * 60 * 60);

    struct Fixture {
        users: Arc<MemoryUsers>,
        legacy: Arc<MemoryLegacy>,
        whitelist: MemoryWhitelist,
        service: AuthService,
    }

    fn fixture(users: MemoryUsers, legacy: MemoryLegacy, single_use: bool) -> Fixture {
        let users = Arc::new(users);
        let legacy = Arc::new(legacy);
        let whitelist = MemoryWhitelist::new();
        let config = Config::new(SECRET, "monban", ACCESS, REFRESH)
            .unwrap()
            .single_use(single_use);
        let service = AuthService::new(
            config,
            users.clone(),
            legacy.clone(),
            Arc::new(whitelist.clone()),
        );
        Fixture {
            users,
            legacy,
            whitelist,
            service,
        }
    }

    fn legacy() -> MemoryLegacy {
        MemoryLegacy::new().with("foo", "bar", profile())
    }

    fn local() -> MemoryUsers {
        let hash = password::hash("local password").unwrap();
        MemoryUsers::with([User::new("local".into(), hash, String::new())])
    }

    fn decode(signed: &str) -> Token {
        Crypto::new(SECRET).decode(signed).unwrap()
    }

    #[tokio::test]
    async fn login_issues_a_linked_pair() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let grant = f.service.login("local", "local password").await.unwrap();
        let access = decode(&grant.access);
        let refresh = decode(&grant.refresh);
        assert!(access.id().is_empty());
        assert!(!refresh.id().is_empty());
        assert_eq!(access.subject(), refresh.subject());
        assert_eq!(access.csrf(), refresh.csrf());
        assert_eq!(access.issued(), refresh.issued());
        assert_eq!(access.duration(), ACCESS);
        assert_eq!(refresh.duration(), REFRESH);
        assert_ne!(access.subject(), "local");
        assert!(f.whitelist.get(refresh.id()).await.unwrap().matches(&refresh));
        assert_eq!(f.whitelist.len(), 1);
        assert_eq!(f.legacy.verifies(), 0);
    }

    #[tokio::test]
    async fn migration_happens_exactly_once() {
        let f = fixture(MemoryUsers::new(), legacy(), false);
        f.service.login("foo", "bar").await.unwrap();
        f.service.login("foo", "bar").await.unwrap();
        assert_eq!(f.users.creates(), 1);
        assert_eq!(f.legacy.verifies(), 1);
        assert_eq!(f.users.len(), 1);
        assert_eq!(f.whitelist.len(), 2);
    }

    #[tokio::test]
    async fn migration_ignores_username_case() {
        let legacy = MemoryLegacy::new().with("Foo", "bar", profile());
        let f = fixture(MemoryUsers::new(), legacy, false);
        for username in ["Foo", "foo", "FOO"] {
            assert!(f.service.login(username, "bar").await.is_ok(), "{}", username);
        }
        assert_eq!(f.users.creates(), 1);
        assert_eq!(f.users.len(), 1);
        assert_eq!(f.legacy.verifies(), 1);
        let user = f.users.lookup("fOO").await.unwrap();
        assert_eq!(user.name(), "Foo");
    }

    #[tokio::test]
    async fn concurrent_first_logins_migrate_once() {
        let f = fixture(MemoryUsers::new(), legacy(), false);
        let (a, b) = tokio::join!(f.service.login("foo", "bar"), f.service.login("foo", "bar"));
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(f.users.creates(), 1);
        assert_eq!(f.users.len(), 1);
    }

    #[tokio::test]
    async fn wrong_passwords_are_wrong_credentials() {
        let f = fixture(local(), legacy(), false);
        let local = f.service.login("local", "guess").await;
        let migrating = f.service.login("foo", "guess").await;
        assert!(matches!(local, Err(AuthError::WrongCredentials)));
        assert!(matches!(migrating, Err(AuthError::WrongCredentials)));
        assert_eq!(f.users.creates(), 0);
        assert!(f.whitelist.is_empty());
    }

    #[tokio::test]
    async fn unknown_users_are_wrong_credentials() {
        let f = fixture(MemoryUsers::new(), legacy(), false);
        let result = f.service.login("nobody", "bar").await;
        assert!(matches!(result, Err(AuthError::WrongCredentials)));
        assert_eq!(f.legacy.verifies(), 1);
        assert_eq!(f.users.creates(), 0);
    }

    #[tokio::test]
    async fn empty_credentials_touch_no_store() {
        let f = fixture(MemoryUsers::new(), legacy(), false);
        for (username, password) in [("", "bar"), ("foo", ""), ("", "")] {
            let result = f.service.login(username, password).await;
            assert!(matches!(result, Err(AuthError::WrongCredentials)));
        }
        assert_eq!(f.users.lookups(), 0);
        assert_eq!(f.legacy.verifies(), 0);
    }

    #[tokio::test]
    async fn legacy_outages_are_internal() {
        let f = fixture(MemoryUsers::new(), MemoryLegacy::broken(), false);
        let result = f.service.login("foo", "bar").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn closed_whitelist_fails_login_as_internal() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        f.whitelist.close().await.unwrap();
        let result = f.service.login("local", "local password").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn refresh_issues_a_new_pair() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let first = f.service.login("local", "local password").await.unwrap();
        let second = f.service.refresh(&first.refresh).await.unwrap();
        let old = decode(&first.refresh);
        let new = decode(&second.refresh);
        assert_ne!(old.id(), new.id());
        assert!(f.whitelist.get(new.id()).await.is_ok());
        assert!(f.service.refresh(&first.refresh).await.is_ok());
        assert_eq!(f.whitelist.len(), 3);
    }

    #[tokio::test]
    async fn never_issued_tokens_are_invalid() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let forged = Token::new("monban", "subject", "csrf", mb_core::now(), REFRESH)
            .identified(mb_core::identifier());
        let signed = Crypto::new(SECRET).encode(&forged).unwrap();
        let result = f.service.refresh(&signed).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn access_tokens_cannot_refresh() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let grant = f.service.login("local", "local password").await.unwrap();
        let result = f.service.refresh(&grant.access).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn tampered_tokens_are_invalid() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let grant = f.service.login("local", "local password").await.unwrap();
        let mut tampered = grant.refresh.into_bytes();
        let at = tampered.iter().position(|b| *b == b'.').unwrap() + 4;
        tampered[at] = if tampered[at] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        let result = f.service.refresh(&tampered).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn policy_mismatches_are_invalid() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let crypto = Crypto::new(SECRET);
        let now = mb_core::now();
        let foreign = Token::new("elsewhere", "s", "c", now, REFRESH).identified("foreign".into());
        let short = Token::new("monban", "s", "c", now, ACCESS).identified("short".into());
        let drifted = Token::new("monban", "s", "c", now, REFRESH).identified("drifted".into());
        f.whitelist.put("foreign", &foreign).await.unwrap();
        f.whitelist.put("short", &short).await.unwrap();
        f.whitelist
            .put("drifted", &Token::new("monban", "s", "other", now, REFRESH).identified("drifted".into()))
            .await
            .unwrap();
        for token in [foreign, short, drifted] {
            let result = f.service.refresh(&crypto.encode(&token).unwrap()).await;
            assert!(matches!(result, Err(AuthError::InvalidToken)), "{}", token.id());
        }
    }

    #[tokio::test]
    async fn expired_refresh_tokens_are_invalid() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let past = mb_core::now() - REFRESH.as_secs() as i64 - 10;
        let stale = Token::new("monban", "s", "c", past, REFRESH).identified("stale".into());
        f.whitelist.put("stale", &stale).await.unwrap();
        let signed = Crypto::new(SECRET).encode(&stale).unwrap();
        let result = f.service.refresh(&signed).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn empty_refresh_touches_no_store() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        f.whitelist.close().await.unwrap();
        let result = f.service.refresh("").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn closed_whitelist_fails_refresh_as_internal() {
        let f = fixture(local(), MemoryLegacy::new(), false);
        let grant = f.service.login("local", "local password").await.unwrap();
        f.whitelist.close().await.unwrap();
        let result = f.service.refresh(&grant.refresh).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn single_use_tokens_rotate() {
        let f = fixture(local(), MemoryLegacy::new(), true);
        let first = f.service.login("local", "local password").await.unwrap();
        let second = f.service.refresh(&first.refresh).await.unwrap();
        let replay = f.service.refresh(&first.refresh).await;
        assert!(matches!(replay, Err(AuthError::InvalidToken)));
        assert_eq!(f.whitelist.len(), 1);
        assert!(f.service.refresh(&second.refresh).await.is_ok());
    }

    #[tokio::test]
    async fn single_use_races_have_one_winner() {
        let f = fixture(local(), MemoryLegacy::new(), true);
        let grant = f.service.login("local", "local password").await.unwrap();
        let (a, b) = tokio::join!(
            f.service.refresh(&grant.refresh),
            f.service.refresh(&grant.refresh)
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(f.whitelist.len(), 1);
    }
}
