//! # Admin Commands
//!
//! ## Product Submission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_product(form, images)                                           │
//! │       │                                                                 │
//! │       ├── submitting? ───────────────────────► BUSY                     │
//! │       ├── not admin? ────────────────────────► FORBIDDEN                │
//! │       ├── no images? ────────────────────────► "Please select at least  │
//! │       │                                          one image"             │
//! │       ├── form parse ────────────────────────► VALIDATION_ERROR         │
//! │       │                                                                 │
//! │       ├── upload_all (parallel, failures dropped)                       │
//! │       │       └── none succeeded ────────────► "No images were uploaded │
//! │       │                                          successfully"          │
//! │       ▼                                                                 │
//! │  remote.create_product ──► ProductCreated ──► "Product added            │
//! │                                                successfully!"           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use tracing::{debug, info};

use storefront_core::validation::validate_image_count;
use storefront_core::{NewProduct, Product};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::forms::ProductForm;
use crate::remote::{upload_all, ImageUpload};
use crate::state::Action;
use crate::Storefront;

pub const NO_IMAGE_SELECTED: &str = "Please select at least one image";
pub const NO_IMAGE_UPLOADED: &str = "No images were uploaded successfully";

/// True when the store's user has the admin role.
pub fn is_admin(app: &Storefront) -> bool {
    app.store.with_state(|s| s.user.is_admin())
}

pub async fn submit_product(
    app: &Storefront,
    form: &ProductForm,
    images: &[ImageUpload],
) -> AppResult<Product> {
    let start = Instant::now();
    let _ticket = app.product_submit.begin()?;
    app.require_session()?;
    if !is_admin(app) {
        return Err(AppError::new(ErrorCode::Forbidden, "Admin access required"));
    }
    debug!(images = images.len(), "submit_product command");

    let result: AppResult<Product> = async {
        if images.is_empty() {
            return Err(AppError::validation(NO_IMAGE_SELECTED));
        }
        validate_image_count(images.len())?;
        // Parse before uploading so a typo doesn't cost an upload
        let draft = form.to_new_product(Vec::new())?;

        let image_urls = upload_all(app.images.as_ref(), images).await;
        if image_urls.is_empty() {
            return Err(AppError::new(ErrorCode::UpstreamError, NO_IMAGE_UPLOADED));
        }

        let product = app
            .remote
            .create_product(NewProduct { image_urls, ..draft })
            .await?;
        Ok(product)
    }
    .await;

    let product = result.map_err(|e| app.report("", e))?;
    app.store.dispatch(Action::ProductCreated(product.clone()));
    app.notifier.success("Product added successfully!");
    info!(
        product_id = %product.id,
        images = product.image_urls.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Product submitted"
    );
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::{image, TestApp};
    use storefront_core::{Money, Role};

    fn form() -> ProductForm {
        let mut form = ProductForm::new();
        form.name = "Linen Shirt".to_string();
        form.category = "topware".to_string();
        form.sizes = "S, M, L".to_string();
        form.set_price("1000");
        form.set_discount_percentage("20");
        form
    }

    #[tokio::test]
    async fn test_admin_submission_keeps_successful_uploads() {
        let t = TestApp::new();
        t.signed_in(Role::Admin).await;

        let product = submit_product(&t.app, &form(), &[image("a.jpg"), image("bad.jpg")])
            .await
            .unwrap();

        assert_eq!(product.image_urls, vec!["https://cdn.example/a.jpg".to_string()]);
        assert_eq!(product.discounted_price, Some(Money::from_major(800)));
        assert_eq!(product.discount_percentage, Some(20));
        assert!(t.app.store.snapshot().catalog.find(&product.id).is_some());
        assert_eq!(
            t.app.notifier.drain()[0].message,
            "Product added successfully!"
        );
        assert!(!t.app.product_submit.is_submitting());
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let t = TestApp::new();
        t.signed_in(Role::User).await;

        let err = submit_product(&t.app, &form(), &[image("a.jpg")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_image_required() {
        let t = TestApp::new();
        t.signed_in(Role::Admin).await;

        let err = submit_product(&t.app, &form(), &[]).await.unwrap_err();
        assert_eq!(err.message, NO_IMAGE_SELECTED);
        assert_eq!(t.app.notifier.drain()[0].message, NO_IMAGE_SELECTED);
    }

    #[tokio::test]
    async fn test_all_uploads_failing() {
        let t = TestApp::new();
        t.signed_in(Role::Admin).await;

        let err = submit_product(&t.app, &form(), &[image("bad1.jpg"), image("bad2.jpg")])
            .await
            .unwrap_err();
        assert_eq!(err.message, NO_IMAGE_UPLOADED);
        assert!(t.app.store.snapshot().catalog.products.is_empty());
    }

    #[tokio::test]
    async fn test_double_submission_rejected() {
        let t = TestApp::new();
        t.signed_in(Role::Admin).await;

        let _held = t.app.product_submit.begin().unwrap();
        let err = submit_product(&t.app, &form(), &[image("a.jpg")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);
    }
}
