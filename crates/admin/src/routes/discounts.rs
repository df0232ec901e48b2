//! Discount management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use puffshop_core::DiscountId;

use crate::db::discounts::DiscountRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{Discount, DiscountInput};
use crate::state::AppState;

/// All discounts, newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Discount>>> {
    let discounts = DiscountRepository::new(state.pool()).list().await?;
    Ok(Json(discounts))
}

/// Discount detail.
#[instrument(skip(state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
) -> Result<Json<Discount>> {
    let discount = DiscountRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Discount not found".to_string()))?;
    Ok(Json(discount))
}

/// Create a discount.
#[instrument(skip(admin, state, input), fields(admin = %admin.email))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<DiscountInput>,
) -> Result<(StatusCode, Json<Discount>)> {
    validate(&input)?;
    let discount = DiscountRepository::new(state.pool()).create(&input).await?;
    tracing::info!(code = %discount.code, "discount created");
    Ok((StatusCode::CREATED, Json(discount)))
}

/// Update a discount.
#[instrument(skip(admin, state, input), fields(admin = %admin.email))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
    Json(input): Json<DiscountInput>,
) -> Result<Json<Discount>> {
    validate(&input)?;
    let discount = DiscountRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(discount))
}

/// Delete a discount.
#[instrument(skip(admin, state), fields(admin = %admin.email))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
) -> Result<StatusCode> {
    DiscountRepository::new(state.pool()).delete(id).await?;
    tracing::info!(discount = %id, "discount deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn validate(input: &DiscountInput) -> Result<()> {
    if input.code.trim().is_empty() {
        return Err(AppError::BadRequest("Code is required".to_string()));
    }
    if input.value.is_sign_negative() {
        return Err(AppError::BadRequest(
            "Value cannot be negative".to_string(),
        ));
    }
    if input.ends_at <= input.starts_at {
        return Err(AppError::BadRequest(
            "End date must be after start date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use puffshop_core::DiscountKind;

    use super::*;

    fn input() -> DiscountInput {
        DiscountInput {
            code: "SUMMER10".to_owned(),
            name: "Summer Sale".to_owned(),
            description: None,
            kind: DiscountKind::Percentage,
            value: Decimal::from(10),
            min_amount: None,
            max_uses: None,
            starts_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("valid date"),
            ends_at: Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).single().expect("valid date"),
            is_active: true,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_input() {
        assert!(validate(&input()).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut bad = input();
        bad.ends_at = bad.starts_at;
        assert!(validate(&bad).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_code() {
        let mut bad = input();
        bad.code = "  ".to_owned();
        assert!(validate(&bad).is_err());
    }
}
