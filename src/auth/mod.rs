//! Authentication and authorization.
//!
//! JWT issuance and validation plus the [`AuthUser`] extractor that carries
//! the authenticated identity through a single request. Identity is always
//! resolved per request from the bearer token; there is no process-global
//! session state.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel};
use crate::errors::ServiceError;
use crate::AppState;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_secs: usize,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_expiration_secs: usize) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_secs,
        }
    }
}

/// Registration payload
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Login payload
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token response returned by register and login
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service handling credentials and token issuance
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Register a new customer account and issue a token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(CustomerModel, TokenResponse), ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = CustomerEntity::find()
            .filter(customer::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            warn!(email = %request.email, "Registration rejected: email already in use");
            return Err(ServiceError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email),
            full_name: Set(request.full_name),
            password_hash: Set(hash_password(&request.password)?),
            address: Set(request.address),
            phone_number: Set(request.phone_number),
            role: Set(customer::ROLE_CUSTOMER.to_string()),
            created_at: Set(Utc::now()),
        };

        let customer = model.insert(&*self.db).await?;
        info!(customer_id = %customer.id, "Customer registered");

        let token = self.generate_token(&customer)?;
        Ok((customer, token))
    }

    /// Verify credentials and issue a token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let customer = CustomerEntity::find()
            .filter(customer::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &customer.password_hash) {
            warn!(customer_id = %customer.id, "Login rejected: bad password");
            return Err(ServiceError::Unauthorized(
                "Invalid credentials".to_string(),
            ));
        }

        info!(customer_id = %customer.id, "Customer logged in");
        self.generate_token(&customer)
    }

    /// Generate a signed JWT for a customer
    pub fn generate_token(&self, customer: &CustomerModel) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now();
        let expires_in = self.config.jwt_expiration_secs as i64;
        let exp = now + ChronoDuration::seconds(expires_in);

        let claims = Claims {
            sub: customer.id.to_string(),
            email: customer.email.clone(),
            role: customer.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Failed to sign token: {}", e)))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in,
        })
    }

    /// Validate a JWT and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Fetch a customer by id
    pub async fn get_customer(&self, id: Uuid) -> Result<Option<CustomerModel>, ServiceError> {
        CustomerEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

/// Hash a password with Argon2 and a fresh random salt
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC-format Argon2 hash.
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authenticated identity extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub customer_id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == customer::ROLE_ADMIN
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Expected bearer token".to_string()))?
            .trim();

        let claims = state.auth.validate_token(token)?;
        let customer_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Malformed token subject".to_string()))?;

        Ok(AuthUser {
            customer_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
