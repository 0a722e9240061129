//! # Views
//!
//! Plain-text pages for the CLI front end. Rendering is a pure function of
//! the configuration and a state snapshot; only [`render`] touches the
//! remote store, for product ids the catalog hasn't loaded.
//!
//! ```text
//! path ──► Route::parse ──► guard(state) ──► render_xxx(config, state) ──► String
//! ```

mod detail;
mod route;

use std::fmt::Write as _;

use tracing::debug;

use storefront_core::catalog::{bestsellers, latest, related};
use storefront_core::{filter_products, FilterCriteria, Product};

use crate::commands::catalog::get_product;
use crate::error::{AppResult, ErrorCode};
use crate::state::{AppState, ConfigState};
use crate::Storefront;

pub use detail::{Carousel, ProductDetail};
pub use route::Route;

pub const NO_PRODUCTS: &str = "No products found";
pub const NO_ADDRESSES: &str = "No addresses added yet";

/// Renders any client-side path.
pub async fn render(app: &Storefront, path: &str) -> AppResult<String> {
    let state = app.store.snapshot();
    let route = Route::parse(path).guard(&state);
    debug!(?route, "Rendering");

    let page = match route {
        Route::Home => render_home(&app.config, &state),
        Route::Search(query) => render_listing(&app.config, &state, &query.to_criteria()),
        Route::Product(id) => match get_product(app, &id).await {
            Ok(product) => render_detail(&app.config, &ProductDetail::new(product), &state),
            Err(e) if e.code == ErrorCode::NotFound => render_not_found(path),
            Err(e) => return Err(e),
        },
        Route::Profile => render_profile(&state),
        Route::Admin => render_admin(),
        Route::SignIn => render_form("Sign In", &["Email", "Password"]),
        Route::SignUp => render_form(
            "Sign Up",
            &["Name", "Email", "Password", "Confirm password"],
        ),
        Route::ForgotPassword => render_form("Forgot Password", &["Email"]),
        Route::NotFound(_) => render_not_found(path),
    };
    Ok(page)
}

// =============================================================================
// Product Cards
// =============================================================================

/// One line per product: name, price, discount.
pub fn render_card(config: &ConfigState, product: &Product) -> String {
    let mut line = format!("[{}] {}", product.id, product.name);
    if product.has_discount() {
        let _ = write!(
            line,
            "  {} (was {})",
            config.format_currency(product.effective_price()),
            config.format_currency(product.price),
        );
        if let Some(pct) = product.discount_percentage {
            let _ = write!(line, " {}% off", pct);
        }
    } else {
        let _ = write!(line, "  {}", config.format_currency(product.price));
    }
    line
}

fn push_cards<'a>(out: &mut String, config: &ConfigState, products: impl IntoIterator<Item = &'a Product>) {
    for product in products {
        out.push_str("  ");
        out.push_str(&render_card(config, product));
        out.push('\n');
    }
}

// =============================================================================
// Pages
// =============================================================================

pub fn render_home(config: &ConfigState, state: &AppState) -> String {
    let products = &state.catalog.products;
    let mut out = format!("== {} ==\n", config.store_name);

    if state.catalog.loading && products.is_empty() {
        out.push_str("Loading...\n");
        return out;
    }

    out.push_str("\nBESTSELLERS\n");
    push_cards(&mut out, config, bestsellers(products));
    out.push_str("\nLATEST COLLECTIONS\n");
    push_cards(&mut out, config, latest(products));
    out
}

pub fn render_listing(config: &ConfigState, state: &AppState, criteria: &FilterCriteria) -> String {
    if state.catalog.loading && state.catalog.products.is_empty() {
        return "Loading products...\n".to_string();
    }

    let visible = filter_products(&state.catalog.products, criteria);
    if visible.is_empty() {
        return format!("{NO_PRODUCTS}\n");
    }

    let mut out = format!(
        "ALL COLLECTIONS ({} products, sort: {})\n",
        visible.len(),
        criteria.sort
    );
    push_cards(&mut out, config, visible);
    out
}

pub fn render_detail(config: &ConfigState, detail: &ProductDetail, state: &AppState) -> String {
    let product = &detail.product;
    let mut out = format!("{}\n{}\n", product.name, render_card(config, product));

    if let Some(url) = detail.current_image() {
        let _ = writeln!(
            out,
            "Image {}/{}: {}",
            detail.carousel.index() + 1,
            product.image_urls.len(),
            url
        );
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    for (label, value) in [("Brand", &product.brand), ("Material", &product.material)] {
        if let Some(value) = value {
            let _ = writeln!(out, "{label}: {value}");
        }
    }
    if let Some(gender) = product.gender {
        let _ = writeln!(out, "Gender: {gender}");
    }
    if !product.colors.is_empty() {
        let _ = writeln!(out, "Colors: {}", product.colors.join(", "));
    }
    if !product.sizes.is_empty() {
        let sizes: Vec<String> = product
            .sizes
            .iter()
            .map(|size| match &detail.selected_size {
                Some(selected) if selected == size => format!("[{size}]"),
                _ => size.clone(),
            })
            .collect();
        let _ = writeln!(out, "Sizes: {}", sizes.join(" "));
    }
    out.push_str(if product.in_stock() { "In stock\n" } else { "Out of stock\n" });

    let related = related(&state.catalog.products, product);
    if !related.is_empty() {
        out.push_str("\nRELATED PRODUCTS\n");
        push_cards(&mut out, config, related);
    }
    out
}

pub fn render_profile(state: &AppState) -> String {
    let Some(user) = &state.user.current else {
        return "Please sign in\n".to_string();
    };

    let mut out = format!("Hello, {}\nEmail: {}\n", user.greeting_name(), user.email);
    if let Some(phone) = &user.phone {
        let _ = writeln!(out, "Phone: {phone}");
    }

    out.push_str("\nADDRESSES\n");
    if user.addresses.is_empty() {
        let _ = writeln!(out, "  {NO_ADDRESSES}");
    }
    for address in &user.addresses {
        let _ = writeln!(
            out,
            "  [{}] {} ({}): {}",
            address.id, address.label, address.address_type, address.full_address
        );
    }
    out
}

fn render_admin() -> String {
    render_form(
        "Add Product",
        &[
            "Images (1-4)",
            "Name",
            "Brand",
            "Description",
            "Price",
            "Discounted price",
            "Discount percentage",
            "Quantity",
            "Category",
            "Subcategories (comma separated)",
            "Tags (comma separated)",
            "Sizes (comma separated)",
            "Colors (comma separated)",
            "Material",
            "Gender",
            "Bestseller",
        ],
    )
}

fn render_form(title: &str, fields: &[&str]) -> String {
    let mut out = format!("{title}\n");
    for field in fields {
        let _ = writeln!(out, "  {field}: ____");
    }
    out
}

pub fn render_not_found(path: &str) -> String {
    format!("404 - Page not found: {path}\n")
}
