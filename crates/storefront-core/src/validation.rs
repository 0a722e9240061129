//! # Validation Module
//!
//! Input validation for forms and remote payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (apps/storefront/src/forms)                             │
//! │  ├── Parses raw text input                                             │
//! │  └── Blocks submission before any remote call                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, formats                                 │
//! │  └── Discount invariant                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store                                                 │
//! │  └── Re-validates payloads before writing                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewAddress, NewProduct};
use crate::{MAX_ITEM_QUANTITY, MAX_PRODUCT_IMAGES, PINCODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("Product name"));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "Product name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a free-text search query.
///
/// ## Rules
/// - Can be empty (shows the whole catalog)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a 6-digit PIN code.
///
/// ```rust
/// use storefront_core::validation::validate_pincode;
///
/// assert!(validate_pincode("560001").is_ok());
/// assert_eq!(validate_pincode("").unwrap_err().to_string(), "PIN code is required");
/// assert!(validate_pincode("56001").is_err());
/// ```
pub fn validate_pincode(pincode: &str) -> ValidationResult<()> {
    let pincode = pincode.trim();

    if pincode.is_empty() {
        return Err(ValidationError::required("PIN code"));
    }

    if pincode.len() != PINCODE_LENGTH || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "PIN code".to_string(),
            reason: format!("must be {} digits", PINCODE_LENGTH),
        });
    }

    Ok(())
}

/// True once a PIN code has enough digits to look up.
pub fn is_complete_pincode(pincode: &str) -> bool {
    validate_pincode(pincode).is_ok()
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// ## Rules
/// - One `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("Email"));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "Email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(email.to_lowercase())
}

/// Validates a password.
///
/// ## Rules
/// - At least 6 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: 6,
        });
    }
    Ok(())
}

/// Validates a display name and returns it trimmed.
pub fn validate_display_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("Name"));
    }
    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "Name".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates a phone number and returns it trimmed.
///
/// ## Rules
/// - Digits with optional leading `+`, spaces and hyphens
/// - 7 to 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "Phone".to_string(),
            reason: "must contain 7 to 15 digits".to_string(),
        });
    }

    Ok(phone.to_string())
}

/// Splits a comma-separated input into trimmed, non-empty values.
///
/// ```rust
/// use storefront_core::validation::split_comma_list;
///
/// assert_eq!(split_comma_list(" S, M ,,L "), vec!["S", "M", "L"]);
/// ```
pub fn split_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - At least 1
/// - At most MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "Quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level (zero allowed).
pub fn validate_stock(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "Quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price (zero allowed).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates the number of product images.
///
/// ## Rules
/// - At least one image
/// - At most MAX_PRODUCT_IMAGES (4)
pub fn validate_image_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::required("Image"));
    }
    if count > MAX_PRODUCT_IMAGES {
        return Err(ValidationError::OutOfRange {
            field: "Images".to_string(),
            min: 1,
            max: MAX_PRODUCT_IMAGES as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Discount Invariant
// =============================================================================

/// Largest gap tolerated between a given percentage and the derived one.
const PERCENT_TOLERANCE: u32 = 1;

/// Checks and completes a product's discount fields.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  discounted  percentage   result                                        │
/// │  ──────────  ──────────   ───────────────────────────────────────────── │
/// │  none        none         (None, None)                                  │
/// │  dp          none         (dp, percent_off(dp))                         │
/// │  none        pct          (apply_percent(pct), pct)                     │
/// │  dp          pct          both kept if |pct - percent_off(dp)| <= 1     │
/// │                                                                         │
/// │  dp > price          → Inconsistent                                     │
/// │  pct > 100           → OutOfRange                                       │
/// │  price == 0 with dp  → Inconsistent (nothing to discount)               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn reconcile_discount(
    price: Money,
    discounted_price: Option<Money>,
    discount_percentage: Option<u32>,
) -> ValidationResult<(Option<Money>, Option<u32>)> {
    validate_price("Price", price)?;

    if let Some(dp) = discounted_price {
        validate_price("Discounted price", dp)?;
        if dp > price {
            return Err(ValidationError::Inconsistent {
                field: "Discounted price".to_string(),
                reason: "must not exceed the price".to_string(),
            });
        }
    }

    if let Some(pct) = discount_percentage {
        if pct > 100 {
            return Err(ValidationError::OutOfRange {
                field: "Discount percentage".to_string(),
                min: 0,
                max: 100,
            });
        }
    }

    let nothing_to_discount = || ValidationError::Inconsistent {
        field: "Discount".to_string(),
        reason: "requires a positive price".to_string(),
    };

    match (discounted_price, discount_percentage) {
        (None, None) => Ok((None, None)),
        (Some(dp), None) => {
            let pct = price.percent_off(dp).ok_or_else(nothing_to_discount)?;
            Ok((Some(dp), Some(pct)))
        }
        (None, Some(pct)) => {
            if !price.is_positive() {
                return Err(nothing_to_discount());
            }
            Ok((Some(price.apply_percent_discount(pct)), Some(pct)))
        }
        (Some(dp), Some(pct)) => {
            let derived = price.percent_off(dp).ok_or_else(nothing_to_discount)?;
            if derived.abs_diff(pct) > PERCENT_TOLERANCE {
                return Err(ValidationError::Inconsistent {
                    field: "Discount percentage".to_string(),
                    reason: format!("{}% does not match the discounted price ({}%)", pct, derived),
                });
            }
            Ok((Some(dp), Some(pct)))
        }
    }
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates an address before it is written.
///
/// Fields are checked in form order, so the first message matches the
/// first empty field on screen.
pub fn validate_new_address(address: &NewAddress) -> ValidationResult<()> {
    validate_pincode(&address.pincode)?;

    let required = [
        ("Street address", &address.street),
        ("City", &address.city),
        ("State", &address.state),
        ("Address label", &address.label),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::required(field));
        }
    }

    Ok(())
}

/// Validates and normalizes a product payload.
///
/// ## What This Does
/// 1. Trims the name and every list entry, dropping empties
/// 2. Requires a category and 1..=4 images
/// 3. Reconciles the discount fields
pub fn validate_new_product(product: NewProduct) -> ValidationResult<NewProduct> {
    let name = validate_product_name(&product.name)?;
    validate_price("Price", product.price)?;
    validate_stock(product.quantity)?;

    let clean = |values: Vec<String>| -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    };

    let categories = clean(product.categories);
    if categories.is_empty() {
        return Err(ValidationError::required("Category"));
    }

    let image_urls = clean(product.image_urls);
    validate_image_count(image_urls.len())?;

    let (discounted_price, discount_percentage) = reconcile_discount(
        product.price,
        product.discounted_price,
        product.discount_percentage,
    )?;

    let trim_opt = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(NewProduct {
        name,
        description: product.description.trim().to_string(),
        discounted_price,
        discount_percentage,
        categories,
        subcategories: clean(product.subcategories),
        tags: clean(product.tags),
        sizes: clean(product.sizes),
        colors: clean(product.colors),
        brand: trim_opt(product.brand),
        material: trim_opt(product.material),
        image_urls,
        ..product
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
