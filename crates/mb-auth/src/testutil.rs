//! In-memory collaborators for exercising [`AuthService`](crate::AuthService)
//! without a database.
use super::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// User store over a map keyed by lower-cased name, counting every call.
#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<String, User>>,
    lookups: AtomicUsize,
    creates: AtomicUsize,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::default();
        store
            .users
            .lock()
            .extend(users.into_iter().map(|u| (u.name().to_lowercase(), u)));
        store
    }
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
    /// Successful inserts only.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
    pub fn len(&self) -> usize {
        self.users.lock().len()
    }
    pub fn is_empty(&self) -> bool {
        self.users.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, user: &User) -> Result<(), UserError> {
        let mut users = self.users.lock();
        let key = user.name().to_lowercase();
        if users.contains_key(&key) {
            return Err(UserError::AlreadyExists);
        }
        users.insert(key, user.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn lookup(&self, name: &str) -> Result<User, UserError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .get(&name.to_lowercase())
            .cloned()
            .ok_or(UserError::NotFound)
    }
}

/// Legacy system over a map of plaintext passwords, counting verifications.
/// Names match ignoring case, like the legacy user table.
#[derive(Default)]
pub struct MemoryLegacy {
    users: HashMap<String, (String, Profile)>,
    verifies: AtomicUsize,
    broken: bool,
}

impl MemoryLegacy {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, name: &str, password: &str, profile: Profile) -> Self {
        let profile = Profile {
            name: name.to_string(),
            ..profile
        };
        self.users
            .insert(name.to_lowercase(), (password.to_string(), profile));
        self
    }
    /// Every call fails with [`LegacyError::Internal`].
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
    pub fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Legacy for MemoryLegacy {
    async fn verify(&self, username: &str, password: &str) -> Result<(), LegacyError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(LegacyError::Internal("legacy system unavailable".to_string()));
        }
        match self.users.get(&username.to_lowercase()) {
            None => Err(LegacyError::NotFound),
            Some((stored, _)) if stored == password => Ok(()),
            Some(_) => Err(LegacyError::WrongCredentials),
        }
    }

    async fn profile(&self, username: &str) -> Result<Profile, LegacyError> {
        if self.broken {
            return Err(LegacyError::Internal("legacy system unavailable".to_string()));
        }
        self.users
            .get(&username.to_lowercase())
            .map(|(_, profile)| profile.clone())
            .ok_or(LegacyError::NotFound)
    }
}

/// A plain legacy profile. [`MemoryLegacy::with`] fills in the name.
pub fn profile() -> Profile {
    Profile {
        name: String::new(),
        email: String::from("someone@example.com"),
        class: String::from("user"),
        admin: false,
        joined: None,
    }
}
