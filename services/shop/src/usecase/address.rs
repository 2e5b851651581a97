use chrono::Utc;
use uuid::Uuid;

use bazaar_domain::address::AddressType;

use crate::domain::repository::AddressRepository;
use crate::domain::types::{Address, non_blank};
use crate::error::ShopServiceError;

/// Raw address fields as submitted. Every field is required.
pub struct AddressInput {
    pub address_type: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

struct ValidAddress {
    address_type: AddressType,
    street: String,
    city: String,
    state: String,
    country: String,
    zip_code: String,
}

fn required(value: &str, field: &str) -> Result<String, ShopServiceError> {
    non_blank(value)
        .map(str::to_owned)
        .ok_or_else(|| ShopServiceError::validation(format!("{field} is required")))
}

fn validate(input: &AddressInput) -> Result<ValidAddress, ShopServiceError> {
    let street = required(&input.street, "street")?;
    let city = required(&input.city, "city")?;
    let state = required(&input.state, "state")?;
    let country = required(&input.country, "country")?;
    let zip_code = required(&input.zip_code, "zip code")?;
    let address_type = input.address_type.trim().parse::<AddressType>().map_err(|_| {
        ShopServiceError::validation("address type must be either shipping or billing")
    })?;
    Ok(ValidAddress {
        address_type,
        street,
        city,
        state,
        country,
        zip_code,
    })
}

async fn owned_address<R: AddressRepository>(
    repo: &R,
    id: Uuid,
    user_id: Uuid,
) -> Result<Address, ShopServiceError> {
    let address = repo
        .find_by_id(id)
        .await?
        .ok_or(ShopServiceError::AddressNotFound)?;
    if address.user_id != user_id {
        return Err(ShopServiceError::NotOwner);
    }
    Ok(address)
}

// ── CreateAddress ────────────────────────────────────────────────────────────

pub struct CreateAddressUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> CreateAddressUseCase<R> {
    /// A user's first address becomes their default. The store keeps at most
    /// one live default per user, so concurrent first inserts yield one default.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: AddressInput,
    ) -> Result<Address, ShopServiceError> {
        let valid = validate(&input)?;
        let is_first = self.repo.list_by_user(user_id).await?.is_empty();
        let now = Utc::now();
        let address = Address {
            id: Uuid::now_v7(),
            user_id,
            address_type: valid.address_type,
            street: valid.street,
            city: valid.city,
            state: valid.state,
            country: valid.country,
            zip_code: valid.zip_code,
            is_default: is_first,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&address).await
    }
}

// ── GetAddress / ListAddresses ───────────────────────────────────────────────

pub struct GetAddressUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> GetAddressUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<Address, ShopServiceError> {
        owned_address(&self.repo, id, user_id).await
    }
}

pub struct ListAddressesUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> ListAddressesUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Address>, ShopServiceError> {
        self.repo.list_by_user(user_id).await
    }
}

// ── UpdateAddress ────────────────────────────────────────────────────────────

pub struct UpdateAddressUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> UpdateAddressUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: AddressInput,
    ) -> Result<Address, ShopServiceError> {
        let mut address = owned_address(&self.repo, id, user_id).await?;
        let valid = validate(&input)?;
        address.address_type = valid.address_type;
        address.street = valid.street;
        address.city = valid.city;
        address.state = valid.state;
        address.country = valid.country;
        address.zip_code = valid.zip_code;
        address.updated_at = Utc::now();
        self.repo.update(&address).await?;
        Ok(address)
    }
}

// ── DeleteAddress ────────────────────────────────────────────────────────────

pub struct DeleteAddressUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> DeleteAddressUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<(), ShopServiceError> {
        owned_address(&self.repo, id, user_id).await?;
        if !self.repo.delete_and_promote(user_id, id).await? {
            return Err(ShopServiceError::AddressNotFound);
        }
        Ok(())
    }
}

// ── SetDefaultAddress ────────────────────────────────────────────────────────

pub struct SetDefaultAddressUseCase<R: AddressRepository> {
    pub repo: R,
}

impl<R: AddressRepository> SetDefaultAddressUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<Address, ShopServiceError> {
        let mut address = owned_address(&self.repo, id, user_id).await?;
        self.repo.set_default(user_id, id).await?;
        address.is_default = true;
        Ok(address)
    }
}
