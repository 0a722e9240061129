//! In-memory remote seams for command tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use storefront_core::validation::validate_new_product;
use storefront_core::{
    Address, CartEntry, Money, NewAddress, NewProduct, Product, ProfileUpdate, Role, User,
};

use crate::remote::{
    AuthProvider, FederatedIdentity, ImageHost, ImageUpload, PostalArea, PostalLookup,
    RemoteError, RemoteResult, RemoteStore, Session,
};
use crate::state::{Action, ConfigState};
use crate::Storefront;

pub fn product(id: &str, price_major: i64) -> Product {
    NewProduct {
        name: format!("Product {id}"),
        price: Money::from_major(price_major),
        categories: vec!["topware".to_string()],
        sizes: vec!["S".to_string(), "M".to_string()],
        image_urls: vec![format!("https://img.example/{id}.jpg")],
        ..NewProduct::default()
    }
    .into_product(id.to_string(), Utc::now())
}

fn injected(message: &str) -> RemoteError {
    RemoteError::Api {
        status: 503,
        message: message.to_string(),
    }
}

// =============================================================================
// RemoteStore
// =============================================================================

#[derive(Default)]
struct RemoteData {
    products: Vec<Product>,
    users: HashMap<String, User>,
    carts: HashMap<String, Vec<CartEntry>>,
    fail_next: Option<String>,
}

#[derive(Default)]
pub struct FakeRemote {
    data: Mutex<RemoteData>,
}

impl FakeRemote {
    pub fn seed_products(&self, products: Vec<Product>) {
        self.data.lock().unwrap().products = products;
    }

    pub fn seed_user(&self, user: User) {
        self.data
            .lock()
            .unwrap()
            .users
            .insert(user.uid.clone(), user);
    }

    pub fn user(&self, uid: &str) -> Option<User> {
        self.data.lock().unwrap().users.get(uid).cloned()
    }

    pub fn cart(&self, uid: &str) -> Vec<CartEntry> {
        self.data
            .lock()
            .unwrap()
            .carts
            .get(uid)
            .cloned()
            .unwrap_or_default()
    }

    /// The next call fails with a 503.
    pub fn fail_next(&self, message: &str) {
        self.data.lock().unwrap().fail_next = Some(message.to_string());
    }

    fn check(&self) -> RemoteResult<()> {
        match self.data.lock().unwrap().fail_next.take() {
            Some(message) => Err(injected(&message)),
            None => Ok(()),
        }
    }

    fn with_user<T>(&self, uid: &str, f: impl FnOnce(&mut User) -> T) -> RemoteResult<T> {
        let mut data = self.data.lock().unwrap();
        let user = data
            .users
            .get_mut(uid)
            .ok_or_else(|| RemoteError::not_found("User", uid))?;
        Ok(f(user))
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn fetch_catalog(&self) -> RemoteResult<Vec<Product>> {
        self.check()?;
        Ok(self.data.lock().unwrap().products.clone())
    }

    async fn fetch_product(&self, id: &str) -> RemoteResult<Option<Product>> {
        self.check()?;
        let data = self.data.lock().unwrap();
        Ok(data.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, data: NewProduct) -> RemoteResult<Product> {
        self.check()?;
        let product = validate_new_product(data)?.into_product(Uuid::new_v4().to_string(), Utc::now());
        self.data.lock().unwrap().products.push(product.clone());
        Ok(product)
    }

    async fn fetch_user(&self, uid: &str) -> RemoteResult<Option<User>> {
        self.check()?;
        Ok(self.user(uid))
    }

    async fn create_user(&self, user: &User) -> RemoteResult<()> {
        self.check()?;
        self.seed_user(user.clone());
        Ok(())
    }

    async fn ensure_user(&self, user: &User) -> RemoteResult<bool> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        if data.users.contains_key(&user.uid) {
            return Ok(false);
        }
        data.users.insert(user.uid.clone(), user.clone());
        Ok(true)
    }

    async fn touch_last_login(&self, uid: &str) -> RemoteResult<()> {
        self.check()?;
        self.with_user(uid, |u| u.last_login = Some(Utc::now()))
    }

    async fn add_address(&self, uid: &str, data: NewAddress) -> RemoteResult<Address> {
        self.check()?;
        let address = data.into_address(Uuid::new_v4().to_string(), Utc::now());
        let stored = address.clone();
        self.with_user(uid, move |u| u.addresses.push(stored))?;
        Ok(address)
    }

    async fn remove_address(&self, uid: &str, address_id: &str) -> RemoteResult<()> {
        self.check()?;
        let found = self.with_user(uid, |u| {
            let before = u.addresses.len();
            u.addresses.retain(|a| a.id != address_id);
            u.addresses.len() != before
        })?;
        if found {
            Ok(())
        } else {
            Err(RemoteError::AddressNotFound)
        }
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> RemoteResult<User> {
        self.check()?;
        self.with_user(uid, |u| {
            if let Some(name) = &update.display_name {
                u.display_name = Some(name.clone());
            }
            if let Some(phone) = &update.phone {
                u.phone = Some(phone.clone());
            }
            u.updated_at = Some(Utc::now());
            u.clone()
        })
    }

    async fn watch_user(&self, uid: &str) -> RemoteResult<watch::Receiver<Option<User>>> {
        self.check()?;
        let (_tx, rx) = watch::channel(self.user(uid));
        Ok(rx)
    }

    async fn put_cart_entry(&self, entry: &CartEntry) -> RemoteResult<()> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let cart = data.carts.entry(entry.user_id.clone()).or_default();
        cart.retain(|e| e.product_id != entry.product_id);
        cart.push(entry.clone());
        Ok(())
    }

    async fn fetch_cart(&self, uid: &str) -> RemoteResult<Vec<CartEntry>> {
        self.check()?;
        Ok(self.cart(uid))
    }

    async fn remove_cart_entry(&self, uid: &str, product_id: &str) -> RemoteResult<bool> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let cart = data.carts.entry(uid.to_string()).or_default();
        let before = cart.len();
        cart.retain(|e| e.product_id != product_id);
        Ok(cart.len() != before)
    }

    async fn clear_cart(&self, uid: &str) -> RemoteResult<()> {
        self.check()?;
        self.data.lock().unwrap().carts.remove(uid);
        Ok(())
    }
}

// =============================================================================
// AuthProvider
// =============================================================================

pub struct FakeAuth {
    /// email → (uid, password)
    accounts: Mutex<HashMap<String, (String, String)>>,
    pub display_names: Mutex<Vec<(String, String)>>,
    pub reset_requests: Mutex<Vec<String>>,
    current: watch::Sender<Option<Session>>,
}

impl Default for FakeAuth {
    fn default() -> Self {
        FakeAuth {
            accounts: Mutex::default(),
            display_names: Mutex::default(),
            reset_requests: Mutex::default(),
            current: watch::channel(None).0,
        }
    }
}

impl FakeAuth {
    fn start(&self, uid: &str, email: &str, display_name: Option<String>) -> Session {
        let session = Session {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name,
            photo_url: None,
            token: format!("token-{uid}"),
            expires_at: Utc::now() + Duration::hours(1),
        };
        self.current.send_replace(Some(session.clone()));
        session
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> RemoteResult<Session> {
        let uid = Uuid::new_v4().to_string();
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(RemoteError::EmailInUse(email.to_string()));
        }
        accounts.insert(email.to_string(), (uid.clone(), password.to_string()));
        drop(accounts);
        Ok(self.start(&uid, email, display_name.map(str::to_string)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((uid, stored)) if stored == password => Ok(self.start(&uid, email, None)),
            _ => Err(RemoteError::InvalidCredentials),
        }
    }

    async fn sign_in_federated(&self, identity: &FederatedIdentity) -> RemoteResult<Session> {
        let uid = self
            .accounts
            .lock()
            .unwrap()
            .entry(identity.email.clone())
            .or_insert_with(|| (Uuid::new_v4().to_string(), String::new()))
            .0
            .clone();
        Ok(self.start(&uid, &identity.email, identity.display_name.clone()))
    }

    async fn sign_out(&self) -> RemoteResult<()> {
        self.current.send_replace(None);
        Ok(())
    }

    async fn restore(&self, token: &str) -> RemoteResult<Option<Session>> {
        let Some(uid) = token.strip_prefix("token-") else {
            return Ok(None);
        };
        let email = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(_, (id, _))| id == uid)
            .map(|(email, _)| email.clone());
        Ok(email.map(|email| self.start(uid, &email, None)))
    }

    fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    fn auth_state(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn update_display_name(&self, uid: &str, display_name: &str) -> RemoteResult<()> {
        self.display_names
            .lock()
            .unwrap()
            .push((uid.to_string(), display_name.to_string()));
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> RemoteResult<()> {
        self.reset_requests.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn confirm_password_reset(&self, token: &str, _new_password: &str) -> RemoteResult<()> {
        if token == "good-token" {
            Ok(())
        } else {
            Err(RemoteError::InvalidResetToken)
        }
    }
}

// =============================================================================
// Images and postal lookup
// =============================================================================

/// Fails any file whose name starts with "bad".
pub struct FakeImages;

#[async_trait]
impl ImageHost for FakeImages {
    async fn upload(&self, image: &ImageUpload) -> RemoteResult<String> {
        if image.file_name.starts_with("bad") {
            return Err(injected("upload rejected"));
        }
        Ok(format!("https://cdn.example/{}", image.file_name))
    }
}

/// Knows one PIN code.
pub struct FakePostal;

#[async_trait]
impl PostalLookup for FakePostal {
    async fn lookup(&self, pincode: &str) -> RemoteResult<Option<PostalArea>> {
        Ok((pincode == "560001").then(|| PostalArea {
            district: "Bangalore".to_string(),
            state: "Karnataka".to_string(),
        }))
    }
}

pub fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        bytes: vec![1, 2, 3],
    }
}

// =============================================================================
// Test App
// =============================================================================

pub struct TestApp {
    pub app: Storefront,
    pub remote: Arc<FakeRemote>,
    pub auth: Arc<FakeAuth>,
}

impl TestApp {
    pub fn new() -> Self {
        let remote = Arc::new(FakeRemote::default());
        let auth = Arc::new(FakeAuth::default());
        let app = Storefront::new(
            ConfigState::default(),
            remote.clone(),
            auth.clone(),
            Arc::new(FakeImages),
            Arc::new(FakePostal),
        );
        TestApp { app, remote, auth }
    }

    /// Signs a user in and mirrors their document into the store.
    pub async fn signed_in(&self, role: Role) -> User {
        let session = self
            .auth
            .sign_up(&format!("{}@example.com", Uuid::new_v4()), "secret1", None)
            .await
            .unwrap();
        let mut user = User::new(&session.uid, &session.email, None, None, Utc::now());
        user.role = role;
        self.remote.seed_user(user.clone());
        self.app.store.dispatch(Action::SetUser(Some(user.clone())));
        user
    }
}
