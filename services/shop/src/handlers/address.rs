use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_auth_types::identity::Identity;
use bazaar_core::envelope::ApiResponse;
use bazaar_domain::address::AddressType;

use crate::domain::types::Address;
use crate::error::ShopServiceError;
use crate::handlers::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::address::{
    AddressInput, CreateAddressUseCase, DeleteAddressUseCase, GetAddressUseCase,
    ListAddressesUseCase, SetDefaultAddressUseCase, UpdateAddressUseCase,
};

#[derive(Serialize)]
pub struct AddressResponse {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub is_default: bool,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "bazaar_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id.to_string(),
            user_id: address.user_id.to_string(),
            address_type: address.address_type,
            street: address.street,
            city: address.city,
            state: address.state,
            country: address.country,
            zip_code: address.zip_code,
            is_default: address.is_default,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}

/// Missing fields deserialize as blank and are reported by name by the use case.
#[derive(Deserialize)]
pub struct AddressRequest {
    #[serde(rename = "type", default)]
    pub address_type: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zip_code: String,
}

impl From<AddressRequest> for AddressInput {
    fn from(body: AddressRequest) -> Self {
        Self {
            address_type: body.address_type,
            street: body.street,
            city: body.city,
            state: body.state,
            country: body.country,
            zip_code: body.zip_code,
        }
    }
}

// ── GET /addresses ───────────────────────────────────────────────────────────

pub async fn list_addresses(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<AddressResponse>>, ShopServiceError> {
    let usecase = ListAddressesUseCase {
        repo: state.address_repo(),
    };
    let addresses = usecase.execute(identity.user_id).await?;
    Ok(ApiResponse::ok(
        addresses.into_iter().map(AddressResponse::from).collect(),
        "addresses retrieved successfully",
    ))
}

// ── POST /addresses ──────────────────────────────────────────────────────────

pub async fn create_address(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddressRequest>,
) -> Result<ApiResponse<AddressResponse>, ShopServiceError> {
    let usecase = CreateAddressUseCase {
        repo: state.address_repo(),
    };
    let address = usecase.execute(identity.user_id, body.into()).await?;
    Ok(ApiResponse::created(
        address.into(),
        "address created successfully",
    ))
}

// ── GET /addresses/{id} ──────────────────────────────────────────────────────

pub async fn get_address(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<AddressResponse>, ShopServiceError> {
    let usecase = GetAddressUseCase {
        repo: state.address_repo(),
    };
    let address = usecase.execute(identity.user_id, id).await?;
    Ok(ApiResponse::ok(
        address.into(),
        "address retrieved successfully",
    ))
}

// ── PUT /addresses/{id} ──────────────────────────────────────────────────────

pub async fn update_address(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddressRequest>,
) -> Result<ApiResponse<AddressResponse>, ShopServiceError> {
    let usecase = UpdateAddressUseCase {
        repo: state.address_repo(),
    };
    let address = usecase.execute(identity.user_id, id, body.into()).await?;
    Ok(ApiResponse::ok(
        address.into(),
        "address updated successfully",
    ))
}

// ── DELETE /addresses/{id} ───────────────────────────────────────────────────

pub async fn delete_address(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ShopServiceError> {
    let usecase = DeleteAddressUseCase {
        repo: state.address_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /addresses/{id}/default ──────────────────────────────────────────────

pub async fn set_default_address(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<AddressResponse>, ShopServiceError> {
    let usecase = SetDefaultAddressUseCase {
        repo: state.address_repo(),
    };
    let address = usecase.execute(identity.user_id, id).await?;
    Ok(ApiResponse::ok(
        address.into(),
        "default address updated successfully",
    ))
}
