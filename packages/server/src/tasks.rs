//! Builtin task library.
//!
//! Registered at startup via [`register_builtin_tasks`]. Executors are pure
//! functions over JSON payloads; validation failures are ordinary task
//! failures and go through the retry path like any other error.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use serde_json::{json, Value};

use crate::kernel::jobs::TaskRegistry;

/// Register the builtin tasks on a registry.
pub fn register_builtin_tasks(registry: &mut TaskRegistry) {
    registry.register("sleep", sleep_task);
    registry.register("sum", sum_task);
    registry.register("fail", fail_task);
    registry.register("generate_monthly_bill", generate_monthly_bill);
}

/// Sleep for `payload.seconds` and report how long.
async fn sleep_task(payload: Value) -> Result<Value> {
    let seconds = payload
        .get("seconds")
        .and_then(Value::as_f64)
        .ok_or_else(|| anyhow!("payload must have a numeric 'seconds' field"))?;
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|_| anyhow!("'seconds' must be a non-negative number"))?;

    tokio::time::sleep(duration).await;
    Ok(json!(format!("Slept for {seconds} seconds.")))
}

/// Sum `payload.numbers` and report the total.
async fn sum_task(payload: Value) -> Result<Value> {
    let numbers = payload
        .get("numbers")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("payload must have a 'numbers' list"))?;

    let mut total = 0.0;
    for number in numbers {
        total += number
            .as_f64()
            .ok_or_else(|| anyhow!("'numbers' entries must be numeric"))?;
    }

    // Render whole sums without a trailing ".0".
    let rendered = if total.fract() == 0.0 {
        format!("Sum is {}", total as i64)
    } else {
        format!("Sum is {total}")
    };
    Ok(Value::String(rendered))
}

/// Always fails; exercises the retry path.
async fn fail_task(_payload: Value) -> Result<Value> {
    bail!("This task always fails!")
}

/// Compute a monthly bill from a base subscription price and a list of
/// one-off purchases. Amounts are rounded to cents.
async fn generate_monthly_bill(payload: Value) -> Result<Value> {
    for field in [
        "user_id",
        "billing_period",
        "subscription_plan",
        "base_price",
        "purchases",
    ] {
        if payload.get(field).is_none() {
            bail!("Missing required field: {field}");
        }
    }

    let purchases = payload["purchases"]
        .as_array()
        .ok_or_else(|| anyhow!("purchases must be a list"))?;
    let base_price = payload["base_price"]
        .as_f64()
        .filter(|price| *price >= 0.0)
        .ok_or_else(|| anyhow!("base_price must be a non-negative number"))?;

    let mut purchases_total = 0.0;
    for purchase in purchases {
        let price = purchase
            .get("price")
            .ok_or_else(|| anyhow!("Each purchase must have a 'price' field"))?;
        purchases_total += price
            .as_f64()
            .filter(|price| *price >= 0.0)
            .ok_or_else(|| anyhow!("Purchase price must be a non-negative number"))?;
    }

    let subscription_charge = base_price;
    let total_charge = subscription_charge + purchases_total;

    Ok(json!({
        "user_id": payload["user_id"],
        "billing_period": payload["billing_period"],
        "subscription_plan": payload["subscription_plan"],
        "subscription_charge": subscription_charge,
        "purchases_total": round_cents(purchases_total),
        "total_charge": round_cents(total_charge),
    }))
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
