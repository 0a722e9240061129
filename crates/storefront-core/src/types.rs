//! # Domain Types
//!
//! Documents mirrored from the document store, plus the payloads used to
//! create them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  products/{id}              users/{uid}            users/{uid}/cart/{p} │
//! │  ┌─────────────────┐   ┌─────────────────┐        ┌─────────────────┐  │
//! │  │    Product      │   │      User       │        │   CartEntry     │  │
//! │  │  ─────────────  │   │  ─────────────  │        │  ─────────────  │  │
//! │  │  price          │   │  role           │        │  product_id     │  │
//! │  │  discounted     │   │  addresses ─────┼──┐     │  quantity       │  │
//! │  │  categories     │   │  last_login     │  │     │  price          │  │
//! │  └─────────────────┘   └─────────────────┘  │     └─────────────────┘  │
//! │                                             ▼                           │
//! │                                   ┌─────────────────┐                   │
//! │                                   │    Address      │ (embedded array)  │
//! │                                   └─────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names serialize in camelCase to match the stored documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::eq_ci;
use crate::error::ValidationError;
use crate::money::Money;
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Enumerations
// =============================================================================

/// Target audience of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Men")]
    Men,
    #[serde(alias = "Women")]
    Women,
    #[serde(alias = "Unisex")]
    Unisex,
    #[serde(alias = "Kids")]
    Kids,
}

impl Gender {
    pub const ALL: [Gender; 4] = [Gender::Men, Gender::Women, Gender::Unisex, Gender::Kids];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
            Gender::Unisex => "unisex",
            Gender::Kids => "kids",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "gender".to_string(),
                allowed: Gender::ALL.iter().map(|g| g.as_str().to_string()).collect(),
            })
    }
}

/// Access level of a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Admin => "admin",
        })
    }
}

/// Kind of delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Work => "work",
            AddressType::Other => "other",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(AddressType::Home),
            "work" => Ok(AddressType::Work),
            "other" => Ok(AddressType::Other),
            "" => Err(ValidationError::required("Address type")),
            _ => Err(ValidationError::NotAllowed {
                field: "Address type".to_string(),
                allowed: vec!["home".into(), "work".into(), "other".into()],
            }),
        }
    }
}

/// Publication status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// ## Categories
/// Older documents store `category` as a single string; newer ones store
/// an array. Both deserialize into `categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Base price.
    pub price: Money,

    /// Sale price, when the product is discounted.
    #[serde(default)]
    pub discounted_price: Option<Money>,

    /// Whole-percent discount kept alongside `discounted_price`.
    #[serde(default)]
    pub discount_percentage: Option<u32>,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Units in stock.
    #[serde(default)]
    pub quantity: i64,

    #[serde(default, alias = "category", deserialize_with = "one_or_many")]
    pub categories: Vec<String>,

    #[serde(default)]
    pub subcategories: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub sizes: Vec<String>,

    #[serde(default)]
    pub colors: Vec<String>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub material: Option<String>,

    #[serde(default)]
    pub gender: Option<Gender>,

    #[serde(default, alias = "images")]
    pub image_urls: Vec<String>,

    #[serde(default)]
    pub bestseller: bool,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub new_arrival: bool,

    /// Soft-delete marker. Written on creation, never consulted by reads.
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default)]
    pub status: ProductStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Discounted price if present, otherwise the base price.
    pub fn effective_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.price)
    }

    /// True when the product sells below its base price.
    pub fn has_discount(&self) -> bool {
        self.discounted_price.is_some_and(|dp| dp < self.price)
    }

    /// First image, used for cards.
    pub fn primary_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// True when both products list a common category (case-insensitive).
    pub fn shares_category_with(&self, other: &Product) -> bool {
        self.categories
            .iter()
            .any(|mine| other.categories.iter().any(|theirs| eq_ci(theirs, mine)))
    }

    /// The product's own spelling of `size`, matched case-insensitively.
    pub fn find_size(&self, size: &str) -> Option<&str> {
        let size = size.trim();
        self.sizes
            .iter()
            .find(|s| eq_ci(s.trim(), size))
            .map(String::as_str)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Accepts `"topware"` or `["topware", "summerware"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(single) if single.trim().is_empty() => Vec::new(),
        OneOrMany::One(single) => vec![single],
        OneOrMany::Many(many) => many,
    })
}

/// Payload for creating a product, produced by the admin form.
///
/// Discount fields are already reconciled (see
/// [`crate::validation::reconcile_discount`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub discounted_price: Option<Money>,
    #[serde(default)]
    pub discount_percentage: Option<u32>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, alias = "category", deserialize_with = "one_or_many")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
}

impl Default for NewProduct {
    fn default() -> Self {
        NewProduct {
            name: String::new(),
            description: String::new(),
            price: Money::zero(),
            discounted_price: None,
            discount_percentage: None,
            currency: default_currency(),
            quantity: 0,
            categories: Vec::new(),
            subcategories: Vec::new(),
            tags: Vec::new(),
            sizes: Vec::new(),
            colors: Vec::new(),
            brand: None,
            material: None,
            gender: None,
            image_urls: Vec::new(),
            bestseller: false,
            featured: false,
            new_arrival: false,
        }
    }
}

impl NewProduct {
    /// Stamps id, timestamps, `is_deleted = false` and `status = active`.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            discounted_price: self.discounted_price,
            discount_percentage: self.discount_percentage,
            currency: self.currency,
            quantity: self.quantity,
            categories: self.categories,
            subcategories: self.subcategories,
            tags: self.tags,
            sizes: self.sizes,
            colors: self.colors,
            brand: self.brand,
            material: self.material,
            gender: self.gender,
            image_urls: self.image_urls,
            bestseller: self.bestseller,
            featured: self.featured,
            new_arrival: self.new_arrival,
            is_deleted: false,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A user profile document, keyed by the auth uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,

    #[serde(default)]
    pub display_name: Option<String>,

    pub email: String,

    #[serde(default, alias = "photoURL")]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub role: Role,

    /// Embedded addresses. Rewritten as a whole on every change.
    #[serde(default)]
    pub addresses: Vec<Address>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// A fresh `role = user` document for a newly registered account.
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<String>,
        photo_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        User {
            uid: uid.into(),
            display_name,
            email: email.into(),
            photo_url,
            phone: None,
            role: Role::User,
            addresses: Vec::new(),
            created_at: now,
            updated_at: None,
            last_login: Some(now),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name, falling back to the email address.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }

    pub fn address(&self, id: &str) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }
}

/// Fields a user can change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.phone.is_none()
    }
}

// =============================================================================
// Address
// =============================================================================

/// A delivery address embedded in a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub street: String,
    #[serde(default)]
    pub landmark: Option<String>,
    pub label: String,
    #[serde(rename = "type", default)]
    pub address_type: AddressType,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
}

/// A validated address waiting for an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub street: String,
    #[serde(default)]
    pub landmark: Option<String>,
    pub label: String,
    #[serde(rename = "type", default)]
    pub address_type: AddressType,
}

impl NewAddress {
    pub fn full_address(&self) -> String {
        format_full_address(
            &self.street,
            self.landmark.as_deref(),
            &self.city,
            &self.state,
            &self.pincode,
        )
    }

    pub fn into_address(self, id: String, now: DateTime<Utc>) -> Address {
        let full_address = self.full_address();
        Address {
            id,
            pincode: self.pincode,
            city: self.city,
            state: self.state,
            street: self.street,
            landmark: self.landmark,
            label: self.label,
            address_type: self.address_type,
            full_address,
            created_at: now,
        }
    }
}

/// `street[, landmark], city, state - pincode`
///
/// ```rust
/// use storefront_core::types::format_full_address;
///
/// assert_eq!(
///     format_full_address("12 MG Road", Some("Near Metro"), "Bengaluru", "Karnataka", "560001"),
///     "12 MG Road, Near Metro, Bengaluru, Karnataka - 560001"
/// );
/// ```
pub fn format_full_address(
    street: &str,
    landmark: Option<&str>,
    city: &str,
    state: &str,
    pincode: &str,
) -> String {
    match landmark.map(str::trim).filter(|l| !l.is_empty()) {
        Some(landmark) => format!("{street}, {landmark}, {city}, {state} - {pincode}"),
        None => format!("{street}, {city}, {state} - {pincode}"),
    }
}

// =============================================================================
// Cart Entry
// =============================================================================

/// One product line in a user's cart.
///
/// ## Price Freezing
/// `price` is the effective price at the moment of adding; later catalog
/// edits do not change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: String,
    pub user_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
    pub price: Money,
    pub added_at: DateTime<Utc>,
}

impl CartEntry {
    pub fn for_product(
        product: &Product,
        user_id: impl Into<String>,
        quantity: i64,
        size: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        CartEntry {
            product_id: product.id.clone(),
            user_id: user_id.into(),
            quantity,
            size,
            price: product.effective_price(),
            added_at: now,
        }
    }

    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "id": "p1",
            "name": "Oversized Tee",
            "price": 99900,
            "discountedPrice": 49900,
            "category": "topware",
            "colors": ["Black"],
            "gender": "Men",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_product_accepts_single_category_and_defaults() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.categories, vec!["topware".to_string()]);
        assert_eq!(product.currency, "INR");
        assert_eq!(product.gender, Some(Gender::Men));
        assert_eq!(product.status, ProductStatus::Active);
        assert!(!product.is_deleted);
        assert_eq!(product.effective_price(), Money::from_major(499));
        assert!(product.has_discount());
    }

    #[test]
    fn test_product_accepts_category_array() {
        let mut value = product_json();
        value["category"] = json!(["topware", "summerware"]);
        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.categories.len(), 2);
    }

    #[test]
    fn test_effective_price_without_discount() {
        let mut value = product_json();
        value["discountedPrice"] = serde_json::Value::Null;
        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.effective_price(), Money::from_major(999));
        assert!(!product.has_discount());
    }

    #[test]
    fn test_find_size_returns_product_spelling() {
        let mut value = product_json();
        value["sizes"] = json!(["S", "XL"]);
        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.find_size("xl"), Some("XL"));
        assert_eq!(product.find_size(" s "), Some("S"));
        assert_eq!(product.find_size("M"), None);
    }

    #[test]
    fn test_gender_from_str() {
        assert_eq!("Women".parse::<Gender>().unwrap(), Gender::Women);
        assert_eq!(" kids ".parse::<Gender>().unwrap(), Gender::Kids);
        assert!("alien".parse::<Gender>().is_err());
    }

    #[test]
    fn test_address_type_from_str() {
        assert_eq!("Work".parse::<AddressType>().unwrap(), AddressType::Work);
        assert_eq!(
            "".parse::<AddressType>().unwrap_err().to_string(),
            "Address type is required"
        );
    }

    #[test]
    fn test_full_address_without_landmark() {
        let address = NewAddress {
            pincode: "110001".into(),
            city: "Central Delhi".into(),
            state: "Delhi".into(),
            street: "1 Janpath".into(),
            landmark: Some("  ".into()),
            label: "Office".into(),
            address_type: AddressType::Work,
        };
        assert_eq!(
            address.full_address(),
            "1 Janpath, Central Delhi, Delhi - 110001"
        );
    }

    #[test]
    fn test_address_type_serializes_as_type() {
        let address = NewAddress {
            pincode: "110001".into(),
            city: "Delhi".into(),
            state: "Delhi".into(),
            street: "1 Janpath".into(),
            landmark: None,
            label: "Home".into(),
            address_type: AddressType::Home,
        }
        .into_address("a1".into(), Utc::now());
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["type"], "home");
        assert_eq!(value["fullAddress"], "1 Janpath, Delhi, Delhi - 110001");
    }

    #[test]
    fn test_cart_entry_uses_effective_price() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        let entry = CartEntry::for_product(&product, "u1", 2, Some("M".into()), Utc::now());
        assert_eq!(entry.price, Money::from_major(499));
        assert_eq!(entry.line_total(), Money::from_major(998));
    }

    #[test]
    fn test_user_greeting_falls_back_to_email() {
        let mut user = User::new("u1", "a@b.com", None, None, Utc::now());
        assert_eq!(user.greeting_name(), "a@b.com");
        user.display_name = Some("Asha".into());
        assert_eq!(user.greeting_name(), "Asha");
        assert!(!user.is_admin());
    }
}
