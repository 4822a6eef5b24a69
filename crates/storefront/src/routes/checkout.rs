//! Checkout route handlers.
//!
//! The backend has no order-placement endpoint for shoppers, so placing an
//! order validates the shipping details, issues a local reference number and
//! empties the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash;
use crate::middleware::OptionalAuth;
use crate::models::session::{load_cart, save_cart};
use crate::routes::PageContext;
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Shipping details form data. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl CheckoutForm {
    /// Check the form, returning one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let required = [
            ("Name", &self.name),
            ("Address", &self.address),
            ("City", &self.city),
            ("Postal code", &self.postal_code),
            ("Country", &self.country),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                errors.push(format!("{label} is required"));
            }
        }
        if let Err(e) = Email::parse(&self.email) {
            errors.push(format!("Invalid email: {e}"));
        }
        errors
    }

    /// Trimmed copy, with the email normalized when it parses.
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: Email::normalize_or_trim(&self.email),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
        }
    }
}

/// Generate a human-friendly order reference, e.g. `SF-3F2A9C1B`.
fn order_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("SF-{}", id.get(..8).unwrap_or(&id).to_uppercase())
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub errors: Vec<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub ctx: PageContext,
    pub reference: String,
    pub cart: CartView,
    pub form: CheckoutForm,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order summary and shipping form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        flash::info(&session, "Your cart is empty").await;
        return Redirect::to("/cart").into_response();
    }

    let form = user
        .map(|user| CheckoutForm {
            name: user.name.unwrap_or_default(),
            email: user.email,
            ..CheckoutForm::default()
        })
        .unwrap_or_default();

    CheckoutTemplate {
        cart: CartView::new(&cart, &state.config().shipping),
        form,
        errors: Vec::new(),
        ctx: PageContext::load(&state, &session).await,
    }
    .into_response()
}

/// Place the order.
#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    if cart.is_empty() {
        flash::info(&session, "Your cart is empty").await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let form = form.trimmed();
    let view = CartView::new(&cart, &state.config().shipping);

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(CheckoutTemplate {
            cart: view,
            form,
            errors,
            ctx: PageContext::load(&state, &session).await,
        }
        .into_response());
    }

    let reference = order_reference();
    cart.clear();
    save_cart(&session, &cart).await?;

    tracing::info!(
        reference = %reference,
        items = view.item_count,
        total = %view.total,
        "Order placed"
    );
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("reference", &reference)]),
    );

    Ok(ConfirmationTemplate {
        reference,
        cart: view,
        form,
        ctx: PageContext::load(&state, &session).await,
    }
    .into_response())
}
