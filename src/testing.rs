//! In-memory stand-ins for the database and the network gateways.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::{
    auth::{jwt::TokenIssuer, password::hash_password},
    config::JwtConfig,
    preferences::PreferenceClient,
    roasters::{repo::RoasterStore, repo_types::{Roaster, RoasterChanges}},
    state::AppState,
    storage::StorageClient,
    users::{repo::UserStore, repo_types::{User, UserChanges}},
};

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
    writes: AtomicUsize,
    fail_writes: bool,
    fail_pass_hash: bool,
}

impl MemoryUsers {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    /// Updates carrying a new hash fail as a whole, leaving the row as it was.
    pub fn failing_password_write() -> Self {
        Self {
            fail_pass_hash: true,
            ..Default::default()
        }
    }

    /// Inserts a user directly, bypassing the write counter.
    pub fn seed(&self, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            pass_hash: hash_password(password).unwrap(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            phone: "555-0100".into(),
            address_line1: "1 Main St".into(),
            address_line2: String::new(),
            address_city: "Ames".into(),
            address_state: "IA".into(),
            address_zip: "50010".into(),
            address_country: "US".into(),
            roaster_id: None,
            profile_url: String::new(),
        };
        self.rows.lock().unwrap().push(user.clone());
        user
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn all(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(&self) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

fn apply<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.get(id))
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<User>> {
        let mut rows = self.all();
        rows.sort_by_key(|u| u.id);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        self.write()?;
        self.rows.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, c: &UserChanges) -> anyhow::Result<()> {
        self.write()?;
        if self.fail_pass_hash && c.pass_hash.is_some() {
            anyhow::bail!("update user password: check constraint violated");
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(u) = rows.iter_mut().find(|u| u.id == id) {
            apply(&mut u.first_name, &c.first_name);
            apply(&mut u.last_name, &c.last_name);
            apply(&mut u.email, &c.email);
            apply(&mut u.phone, &c.phone);
            apply(&mut u.address_line1, &c.address_line1);
            apply(&mut u.address_line2, &c.address_line2);
            apply(&mut u.address_city, &c.address_city);
            apply(&mut u.address_state, &c.address_state);
            apply(&mut u.address_zip, &c.address_zip);
            apply(&mut u.address_country, &c.address_country);
            apply(&mut u.profile_url, &c.profile_url);
            apply(&mut u.pass_hash, &c.pass_hash);
            if let Some(roaster_id) = c.roaster_id {
                u.roaster_id = roaster_id;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.write()?;
        self.rows.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn set_profile_url(&self, id: Uuid, url: &str) -> anyhow::Result<()> {
        self.write()?;
        if let Some(u) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == id) {
            u.profile_url = url.to_string();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRoasters {
    rows: Mutex<Vec<Roaster>>,
    fail: bool,
}

impl MemoryRoasters {
    /// Every store call errors, reads included.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    pub fn seed(&self, name: &str) -> Roaster {
        let roaster = Roaster {
            id: Uuid::new_v4(),
            name: name.into(),
            email: "beans@example.com".into(),
            phone: "555-0199".into(),
            address_line1: "2 Mill Rd".into(),
            address_line2: String::new(),
            address_city: "Ames".into(),
            address_state: "IA".into(),
            address_zip: "50010".into(),
            address_country: "US".into(),
        };
        self.rows.lock().unwrap().push(roaster.clone());
        roaster
    }

    pub fn get(&self, id: Uuid) -> Option<Roaster> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl RoasterStore for MemoryRoasters {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Roaster>> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<Roaster>> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn insert(&self, roaster: &Roaster) -> anyhow::Result<()> {
        self.check()?;
        self.rows.lock().unwrap().push(roaster.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, c: &RoasterChanges) -> anyhow::Result<()> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(r) = rows.iter_mut().find(|r| r.id == id) {
            apply(&mut r.name, &c.name);
            apply(&mut r.email, &c.email);
            apply(&mut r.phone, &c.phone);
            apply(&mut r.address_line1, &c.address_line1);
            apply(&mut r.address_line2, &c.address_line2);
            apply(&mut r.address_city, &c.address_city);
            apply(&mut r.address_state, &c.address_state);
            apply(&mut r.address_zip, &c.address_zip);
            apply(&mut r.address_country, &c.address_country);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStorage {
    uploads: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn upload(
        &self,
        folder: &str,
        key: &str,
        _body: Bytes,
        _content_type: &str,
    ) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("bucket unavailable");
        }
        self.uploads
            .lock()
            .unwrap()
            .push((folder.to_string(), key.to_string()));
        Ok(format!("https://fake.local/{}/{}", folder, key))
    }
}

#[derive(Default)]
pub struct FakePreferences {
    created: Mutex<Vec<Uuid>>,
    fail: bool,
}

impl FakePreferences {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<Uuid> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PreferenceClient for FakePreferences {
    async fn create_default(&self, user_id: Uuid) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("preference service down");
        }
        self.created.lock().unwrap().push(user_id);
        Ok(())
    }
}

pub fn jwt_config(enforce: bool) -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.into(),
        ttl_days: 30,
        enforce,
    }
}

/// Handles on the fakes behind a test `AppState`.
pub struct Harness {
    pub state: AppState,
    pub users: Arc<MemoryUsers>,
    pub roasters: Arc<MemoryRoasters>,
    pub storage: Arc<FakeStorage>,
    pub preferences: Arc<FakePreferences>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            MemoryUsers::default(),
            FakeStorage::default(),
            FakePreferences::default(),
            false,
        )
    }

    pub fn with(
        users: MemoryUsers,
        storage: FakeStorage,
        preferences: FakePreferences,
        enforce: bool,
    ) -> Self {
        Self::build(users, MemoryRoasters::default(), storage, preferences, enforce)
    }

    pub fn with_roasters(roasters: MemoryRoasters) -> Self {
        Self::build(
            MemoryUsers::default(),
            roasters,
            FakeStorage::default(),
            FakePreferences::default(),
            false,
        )
    }

    fn build(
        users: MemoryUsers,
        roasters: MemoryRoasters,
        storage: FakeStorage,
        preferences: FakePreferences,
        enforce: bool,
    ) -> Self {
        let users = Arc::new(users);
        let roasters = Arc::new(roasters);
        let storage = Arc::new(storage);
        let preferences = Arc::new(preferences);
        let jwt = jwt_config(enforce);
        let state = AppState::from_parts(
            users.clone(),
            roasters.clone(),
            storage.clone(),
            preferences.clone(),
            Arc::new(TokenIssuer::new(&jwt)),
            enforce,
        );
        Self {
            state,
            users,
            roasters,
            storage,
            preferences,
        }
    }
}
