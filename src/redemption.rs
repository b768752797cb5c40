//! Redemption coordinator: turns an eligible order into bound license keys.
//!
//! One code path serves website orders, Amazon order ids, and secret codes;
//! the eligibility gate's delay rule is the only part conditioned on the
//! fulfillment type. Replay is success, not an error: re-checking an order
//! always returns the identical key set with `already_redeemed = true`.

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::catalog;
use crate::db::{inventory, queries};
use crate::eligibility::{self, DelayPolicy, Eligibility};
use crate::error::{AppError, Result};
use crate::identifier::OrderIdentifier;
use crate::models::{FulfillmentType, LicenseKey, ProductInfo};

/// A claimed key enriched with display metadata for its component.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemedKey {
    pub key: String,
    pub component_id: String,
    pub product: Option<ProductInfo>,
}

#[derive(Debug, Serialize)]
pub struct RedeemOutcome {
    pub already_redeemed: bool,
    pub keys: Vec<RedeemedKey>,
    /// Components that were freshly claimed (drives low-inventory checks).
    #[serde(skip)]
    pub claimed_components: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOutcome {
    pub order_identifier: String,
    pub fulfillment_type: FulfillmentType,
    pub quantity: i64,
    pub already_redeemed: bool,
    /// Bound keys when the order was previously redeemed, empty otherwise.
    pub keys: Vec<RedeemedKey>,
    pub components: Vec<String>,
    /// Metadata of the sold FSN (combo name for bundles).
    pub product_name: Option<String>,
    pub product: Option<ProductInfo>,
}

/// Read-only precheck: eligibility plus product metadata, never allocates.
pub fn verify(conn: &Connection, raw_identifier: &str, now: i64) -> Result<VerifyOutcome> {
    let identifier = OrderIdentifier::parse(raw_identifier)?;
    let order = queries::get_order(conn, &identifier)?
        .ok_or_else(|| AppError::NotFound(not_found_message(&identifier)))?;

    let policy = load_policy(conn)?;
    if let Eligibility::Deny(denial) = eligibility::check(&order, &policy, now) {
        return Err(AppError::ineligible(denial));
    }

    let bound = inventory::keys_bound_to_order(conn, &order.order_identifier)?;
    let already_redeemed = !bound.is_empty();
    let keys = enrich(conn, bound)?;

    let (components, product_name, product) = match order.product_component.as_deref() {
        Some(fsn) => {
            let components = catalog::resolve_components(fsn);
            let product = queries::get_product(conn, fsn)?;
            let product_name = catalog::combo_display_name(fsn)
                .map(str::to_string)
                .or_else(|| product.as_ref().map(|p| p.display_name.clone()));
            (components, product_name, product)
        }
        None => (Vec::new(), None, None),
    };

    Ok(VerifyOutcome {
        order_identifier: order.order_identifier,
        fulfillment_type: order.fulfillment_type,
        quantity: order.quantity,
        already_redeemed,
        keys,
        components,
        product_name,
        product,
    })
}

/// Allocate keys for an order, exactly once.
///
/// The allocation runs inside a single IMMEDIATE transaction: the
/// idempotency re-check and every per-component claim happen under the
/// writer lock, so two duplicate calls cannot both allocate, and a
/// shortfall on any component rolls the whole attempt back with nothing
/// bound.
pub fn redeem(conn: &mut Connection, raw_identifier: &str, now: i64) -> Result<RedeemOutcome> {
    let identifier = OrderIdentifier::parse(raw_identifier)?;
    let order = queries::get_order(conn, &identifier)?
        .ok_or_else(|| AppError::NotFound(not_found_message(&identifier)))?;

    let policy = load_policy(conn)?;
    if let Eligibility::Deny(denial) = eligibility::check(&order, &policy, now) {
        return Err(AppError::ineligible(denial));
    }

    // Fast-path replay: previously bound keys are the stable answer.
    let bound = inventory::keys_bound_to_order(conn, &order.order_identifier)?;
    if !bound.is_empty() {
        let keys = enrich(conn, bound)?;
        return Ok(RedeemOutcome {
            already_redeemed: true,
            keys,
            claimed_components: Vec::new(),
        });
    }

    let fsn = order.product_component.as_deref().ok_or_else(|| {
        AppError::Configuration(format!(
            "order {} has no product component mapped",
            order.order_identifier
        ))
    })?;
    let components = catalog::resolve_components(fsn);
    let per_component = order.quantity;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Re-check under the writer lock: the loser of a duplicate race lands
    // here after the winner committed and must return the winner's keys.
    let bound = inventory::keys_bound_to_order(&tx, &order.order_identifier)?;
    if !bound.is_empty() {
        drop(tx);
        let keys = enrich(conn, bound)?;
        return Ok(RedeemOutcome {
            already_redeemed: true,
            keys,
            claimed_components: Vec::new(),
        });
    }

    let mut claimed: Vec<LicenseKey> = Vec::new();
    for component in &components {
        let batch =
            inventory::claim_keys(&tx, component, &order.order_identifier, per_component, now)?;
        if (batch.len() as i64) < per_component {
            // Dropping the transaction releases every key claimed so far in
            // this attempt, for this component and the earlier ones.
            let available = batch.len() as i64;
            drop(tx);
            return Err(AppError::InsufficientInventory {
                component_id: component.clone(),
                needed: per_component,
                available,
            });
        }
        claimed.extend(batch);
    }

    tx.commit()?;

    // Replay reads the bound set back in (created_at, key) order; sort the
    // fresh allocation the same way so both responses are identical.
    inventory::sort_claim_order(&mut claimed);

    tracing::info!(
        order_identifier = %order.order_identifier,
        components = components.len(),
        keys = claimed.len(),
        "allocated license keys"
    );

    let keys = enrich(conn, claimed)?;
    Ok(RedeemOutcome {
        already_redeemed: false,
        keys,
        claimed_components: components,
    })
}

fn load_policy(conn: &Connection) -> Result<DelayPolicy> {
    Ok(DelayPolicy::new(queries::get_state_delays(conn)?))
}

fn not_found_message(identifier: &OrderIdentifier) -> String {
    match identifier {
        OrderIdentifier::AmazonOrderId(_) => {
            "Amazon Order ID not found. Please check your order ID and try again.".to_string()
        }
        OrderIdentifier::SecretCode(_) => {
            "Secret code not found. Please check your code and try again.".to_string()
        }
    }
}

/// Attach display metadata per component. Missing metadata degrades to
/// `None`, it never fails the redemption.
fn enrich(conn: &Connection, keys: Vec<LicenseKey>) -> Result<Vec<RedeemedKey>> {
    keys.into_iter()
        .map(|key| {
            let product = queries::get_product(conn, &key.component_id)?;
            Ok(RedeemedKey {
                key: key.key,
                component_id: key.component_id,
                product,
            })
        })
        .collect()
}
