//! # Command Line Front End
//!
//! Each invocation restores the saved session, loads the catalog, runs one
//! subcommand and prints whatever notifications it queued.
//!
//! ## Usage
//! ```bash
//! storefront view /search?category=topware&sort=low-to-high
//! storefront sign-in --email asha@example.com --password ...
//! storefront address add --pincode 560001 --street "12 MG Road" --label Home
//! storefront product add --name "Linen Shirt" --price 1299 --discount-percentage 20 \
//!     --category topware --sizes S,M,L shirt-front.jpg shirt-back.jpg
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::commands::{admin, auth, cart, catalog, profile};
use crate::error::{AppError, AppResult};
use crate::forms::{
    AddressForm, ForgotPasswordForm, PincodeLookup, ProductForm, ProfileForm, SignInForm,
    SignUpForm,
};
use crate::notify::Level;
use crate::remote::{FederatedIdentity, ImageUpload};
use crate::state::ConfigState;
use crate::{
    build_storefront, get_data_dir, open_database, read_session_token, remove_session_token,
    views, write_session_token, Storefront,
};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Clothing storefront")]
pub struct Cli {
    /// Config file (defaults to storefront.toml in the platform config dir)
    #[arg(long, global = true, env = "STOREFRONT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a page, e.g. `/`, `/search?q=shirt`, `/product/<id>`
    View { path: String },

    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with an identity asserted by an external provider
    SignInFederated {
        #[arg(long, default_value = "google")]
        provider: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },

    SignOut,

    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user
    Whoami,

    #[command(subcommand)]
    Profile(ProfileCommand),

    #[command(subcommand)]
    Address(AddressCommand),

    #[command(subcommand)]
    Cart(CartCommand),

    #[command(subcommand)]
    Product(ProductCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Change display name and phone; omitted fields keep their value
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddressCommand {
    Add(AddressArgs),
    Remove { id: String },
}

#[derive(Debug, Args)]
pub struct AddressArgs {
    /// Six-digit PIN code; fills city and state when the lookup knows it
    #[arg(long)]
    pincode: String,
    #[arg(long)]
    street: String,
    #[arg(long, default_value = "")]
    landmark: String,
    #[arg(long)]
    label: String,
    /// home, work or other
    #[arg(long = "type", default_value = "home")]
    address_type: String,
    /// Overrides the looked-up city
    #[arg(long)]
    city: Option<String>,
    /// Overrides the looked-up state
    #[arg(long)]
    state: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        #[arg(long)]
        size: Option<String>,
    },
    List,
    Remove { product_id: String },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Add a product (admins only). Images are local files, one to four.
    Add(ProductArgs),
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: String,
    /// Sets the discount percentage from the price
    #[arg(long, conflicts_with = "discount_percentage")]
    discounted_price: Option<String>,
    /// Sets the discounted price from the price
    #[arg(long)]
    discount_percentage: Option<String>,
    #[arg(long, default_value = "0")]
    quantity: String,
    #[arg(long)]
    category: String,
    /// Comma separated
    #[arg(long, default_value = "")]
    subcategories: String,
    #[arg(long, default_value = "")]
    tags: String,
    #[arg(long, default_value = "")]
    sizes: String,
    #[arg(long, default_value = "")]
    colors: String,
    #[arg(long, default_value = "")]
    material: String,
    #[arg(long, default_value = "")]
    gender: String,
    #[arg(long)]
    bestseller: bool,
    #[arg(long)]
    featured: bool,
    #[arg(long)]
    new_arrival: bool,
    images: Vec<PathBuf>,
}

impl ProductArgs {
    fn to_form(&self) -> ProductForm {
        let mut form = ProductForm::new();
        form.name = self.name.clone();
        form.brand = self.brand.clone();
        form.description = self.description.clone();
        form.quantity = self.quantity.clone();
        form.category = self.category.clone();
        form.subcategories = self.subcategories.clone();
        form.tags = self.tags.clone();
        form.sizes = self.sizes.clone();
        form.colors = self.colors.clone();
        form.material = self.material.clone();
        form.gender = self.gender.clone();
        form.bestseller = self.bestseller;
        form.featured = self.featured;
        form.new_arrival = self.new_arrival;
        form.set_price(&self.price);
        if let Some(dp) = &self.discounted_price {
            form.set_discounted_price(dp);
        }
        if let Some(pct) = &self.discount_percentage {
            form.set_discount_percentage(pct);
        }
        form
    }
}

// =============================================================================
// Entry
// =============================================================================

/// Runs one invocation end to end.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = ConfigState::load(cli.config.clone())?;
    let data_dir = get_data_dir()?;
    let db = open_database(&config, &data_dir).await?;
    let app = build_storefront(config, db);

    let token = read_session_token(&data_dir);
    match auth::restore_session(&app, token.as_deref()).await {
        Ok(None) if token.is_some() => {
            info!("Saved session expired");
            remove_session_token(&data_dir)?;
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not restore session"),
    }
    // Failures are already queued as notifications
    let _ = catalog::load_catalog(&app).await;

    let result = execute(&app, &data_dir, cli.command).await;
    print_notifications(&app);
    result
}

async fn execute(app: &Storefront, data_dir: &Path, command: Command) -> AppResult<()> {
    match command {
        Command::View { path } => {
            print!("{}", views::render(app, &path).await?);
        }
        Command::SignUp {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = SignUpForm {
                display_name: name,
                email,
                password,
                confirm_password,
            };
            auth::sign_up(app, &form).await?;
            save_session(app, data_dir)?;
        }
        Command::SignIn { email, password } => {
            auth::sign_in(app, &SignInForm { email, password }).await?;
            save_session(app, data_dir)?;
        }
        Command::SignInFederated {
            provider,
            email,
            name,
            photo_url,
        } => {
            let identity = FederatedIdentity {
                provider,
                email,
                display_name: name,
                photo_url,
            };
            auth::sign_in_federated(app, &identity).await?;
            save_session(app, data_dir)?;
        }
        Command::SignOut => {
            auth::sign_out(app).await?;
            remove_session_token(data_dir)?;
        }
        Command::ForgotPassword { email } => {
            auth::forgot_password(app, &ForgotPasswordForm { email }).await?;
        }
        Command::ResetPassword { token, password } => {
            auth::reset_password(app, &token, &password).await?;
        }
        Command::Whoami => match app.store.snapshot().user.current {
            Some(user) => println!("{} <{}> ({})", user.greeting_name(), user.email, user.role),
            None => println!("Not signed in"),
        },
        Command::Profile(ProfileCommand::Update { name, phone }) => {
            let session = app.require_session()?;
            let current = app
                .store
                .snapshot()
                .user
                .current
                .ok_or_else(|| AppError::not_found("User", &session.uid))?;
            let mut form = ProfileForm::from_user(&current);
            if let Some(name) = name {
                form.display_name = name;
            }
            if let Some(phone) = phone {
                form.phone = phone;
            }
            profile::update_profile(app, &form).await?;
        }
        Command::Address(AddressCommand::Add(args)) => {
            let form = address_form(app, args).await;
            let address = profile::add_address(app, &form).await?;
            println!("{}", address.id);
        }
        Command::Address(AddressCommand::Remove { id }) => {
            profile::remove_address(app, &id).await?;
        }
        Command::Cart(CartCommand::Add {
            product_id,
            quantity,
            size,
        }) => {
            cart::add_to_cart(app, &product_id, quantity, size.as_deref()).await?;
        }
        Command::Cart(CartCommand::List) => {
            cart::refresh_cart(app).await?;
            print_cart(app);
        }
        Command::Cart(CartCommand::Remove { product_id }) => {
            cart::remove_from_cart(app, &product_id).await?;
        }
        Command::Cart(CartCommand::Clear) => cart::clear_cart(app).await?,
        Command::Product(ProductCommand::Add(args)) => {
            let images = read_images(&args.images)?;
            let product = admin::submit_product(app, &args.to_form(), &images).await?;
            println!("{}", product.id);
        }
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn save_session(app: &Storefront, data_dir: &Path) -> AppResult<()> {
    match app.auth.current_session() {
        Some(session) => write_session_token(data_dir, &session.token),
        None => Ok(()),
    }
}

async fn address_form(app: &Storefront, args: AddressArgs) -> AddressForm {
    let mut form = AddressForm::new();
    if let PincodeLookup::Filled(area) = form.set_pincode(&args.pincode, app.postal.as_ref()).await
    {
        debug!(district = %area.district, state = %area.state, "PIN code resolved");
    }
    if let Some(city) = args.city {
        form.city = city;
    }
    if let Some(state) = args.state {
        form.state = state;
    }
    form.street = args.street;
    form.landmark = args.landmark;
    form.label = args.label;
    form.address_type = args.address_type;
    form
}

fn read_images(paths: &[PathBuf]) -> AppResult<Vec<ImageUpload>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|e| {
                AppError::validation(format!("Could not read {}: {}", path.display(), e))
            })?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            Ok(ImageUpload { file_name, bytes })
        })
        .collect()
}

fn print_cart(app: &Storefront) {
    let response = cart::get_cart(app);
    if response.entries.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for entry in &response.entries {
        println!(
            "  {} x{} {} @ {}",
            entry.product_id,
            entry.quantity,
            entry.size.as_deref().unwrap_or("-"),
            app.config.format_currency(entry.price)
        );
    }
    println!(
        "{} items, subtotal {}",
        response.totals.total_quantity,
        app.config.format_currency(response.totals.subtotal)
    );
}

fn print_notifications(app: &Storefront) {
    for notification in app.notifier.drain() {
        match notification.level {
            Level::Success => println!("✓ {}", notification.message),
            Level::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::DiscountMode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_product_add() {
        let cli = Cli::parse_from([
            "storefront",
            "product",
            "add",
            "--name",
            "Linen Shirt",
            "--price",
            "999",
            "--discounted-price",
            "500",
            "--category",
            "topware",
            "front.jpg",
        ]);
        let Command::Product(ProductCommand::Add(args)) = cli.command else {
            panic!("expected product add");
        };
        let form = args.to_form();
        assert_eq!(form.discount_percentage(), "49");
        assert_eq!(args.images, vec![PathBuf::from("front.jpg")]);
    }

    #[test]
    fn test_product_args_fill_form_in_percentage_mode() {
        let cli = Cli::parse_from([
            "storefront",
            "product",
            "add",
            "--name",
            "Linen Shirt",
            "--price",
            "999",
            "--discount-percentage",
            "33",
            "--category",
            "topware",
            "--sizes",
            "S,M",
            "--bestseller",
        ]);
        let Command::Product(ProductCommand::Add(args)) = cli.command else {
            panic!("expected product add");
        };
        let form = args.to_form();
        assert_eq!(form.name, "Linen Shirt");
        assert_eq!(form.sizes, "S,M");
        assert!(form.bestseller);
        assert_eq!(form.mode(), DiscountMode::Percentage);
        assert_eq!(form.discounted_price(), "669.00");
    }

    #[test]
    fn test_parse_address_type_flag() {
        let cli = Cli::parse_from([
            "storefront",
            "address",
            "add",
            "--pincode",
            "560001",
            "--street",
            "12 MG Road",
            "--label",
            "Office",
            "--type",
            "work",
        ]);
        let Command::Address(AddressCommand::Add(args)) = cli.command else {
            panic!("expected address add");
        };
        assert_eq!(args.address_type, "work");
        assert_eq!(args.city, None);
    }
}
