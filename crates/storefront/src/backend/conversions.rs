//! Conversions from wire DTOs into validated domain types.

use reqwest::StatusCode;
use secrecy::SecretString;

use qkart_core::{CartRecord, Product, ProductError, ProductId, Rating};

use super::ApiError;
use super::types::{CartRecordDto, LoginResponse, LoginResponseDto, ProductDto, RegisterResponseDto};

pub fn convert_product(dto: ProductDto) -> Result<Product, ApiError> {
    let id = ProductId::new(dto.id);
    let rating = Rating::new(dto.rating).map_err(|source| ProductError::Rating {
        id: id.clone(),
        source,
    });
    let product = Product {
        id,
        name: dto.name,
        category: dto.category,
        cost: dto.cost,
        rating: rating.map_err(malformed)?,
        image: dto.image,
    };
    product.validate().map_err(malformed)?;
    Ok(product)
}

pub fn convert_products(dtos: Vec<ProductDto>) -> Result<Vec<Product>, ApiError> {
    dtos.into_iter().map(convert_product).collect()
}

pub fn convert_cart_record(dto: CartRecordDto) -> Result<CartRecord, ApiError> {
    if dto.product_id.is_empty() {
        return Err(ApiError::Malformed("cart record has an empty productId".to_string()));
    }
    if dto.qty == 0 {
        return Err(ApiError::Malformed(format!(
            "cart record for {} has zero quantity",
            dto.product_id
        )));
    }
    Ok(CartRecord::new(dto.product_id, dto.qty))
}

pub fn convert_cart_records(dtos: Vec<CartRecordDto>) -> Result<Vec<CartRecord>, ApiError> {
    dtos.into_iter().map(convert_cart_record).collect()
}

/// A 2xx login body must carry `success: true` and the session fields.
pub fn convert_login_response(
    status: StatusCode,
    dto: LoginResponseDto,
) -> Result<LoginResponse, ApiError> {
    if !dto.success {
        return Err(ApiError::Rejected {
            status,
            message: dto
                .message
                .unwrap_or_else(|| "Login was not accepted".to_string()),
        });
    }

    let (Some(token), Some(username), Some(balance)) = (dto.token, dto.username, dto.balance)
    else {
        return Err(ApiError::Malformed(
            "login response is missing token, username or balance".to_string(),
        ));
    };

    Ok(LoginResponse {
        token: SecretString::from(token),
        username,
        balance,
    })
}

pub fn convert_register_response(
    status: StatusCode,
    dto: RegisterResponseDto,
) -> Result<(), ApiError> {
    if dto.success {
        Ok(())
    } else {
        Err(ApiError::Rejected {
            status,
            message: dto
                .message
                .unwrap_or_else(|| "Registration was not accepted".to_string()),
        })
    }
}

fn malformed(err: ProductError) -> ApiError {
    ApiError::Malformed(err.to_string())
}
