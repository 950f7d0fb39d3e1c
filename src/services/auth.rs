// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, CreateUserPayload, User, UserRole},
};

/// Validade do token de acesso.
const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 Login de {} ({:?})", user.email, user.role);
        issue_token(user.id, &self.jwt_secret)
    }

    /// Token válido => usuário atual do banco (papel e tema sempre frescos).
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Cadastra um usuário no ambiente de quem está criando.
    pub async fn create_user(
        &self,
        actor: &User,
        payload: CreateUserPayload,
    ) -> Result<User, AppError> {
        payload.validate()?;
        ensure_can_assign_role(actor.role, payload.role)?;

        let hashed_password = hash_password(&payload.password).await?;

        let user = self.user_repo
            .create_user(
                &self.pool,
                actor.tenant_id,
                &payload.name,
                &payload.email,
                &hashed_password,
                payload.role,
            )
            .await?;

        tracing::info!("👤 Usuário {} criado no ambiente {}", user.email, user.tenant_id);
        Ok(user)
    }
}

/// Apenas o administrador global pode criar outros administradores globais.
pub fn ensure_can_assign_role(actor: UserRole, requested: UserRole) -> Result<(), AppError> {
    match (actor, requested) {
        (UserRole::Admin, _) => Ok(()),
        (UserRole::TenantAdmin, UserRole::Admin) => Err(AppError::Forbidden),
        (UserRole::TenantAdmin, _) => Ok(()),
        (UserRole::Courier, _) => Err(AppError::Forbidden),
    }
}

/// bcrypt é caro: roda fora do executor assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || {
        hash(&password_clone, bcrypt::DEFAULT_COST)
    })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
        ?;
    Ok(hashed)
}

pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_user_and_seven_day_expiry() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "segredo").unwrap();

        let claims = decode_token(&token, "segredo").unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), "segredo").unwrap();

        assert!(matches!(decode_token(&token, "outro"), Err(AppError::InvalidToken)));
        assert!(matches!(decode_token("lixo", "segredo"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn tenant_admin_cannot_create_global_admin() {
        assert!(ensure_can_assign_role(UserRole::Admin, UserRole::Admin).is_ok());
        assert!(ensure_can_assign_role(UserRole::TenantAdmin, UserRole::Courier).is_ok());
        assert!(ensure_can_assign_role(UserRole::TenantAdmin, UserRole::TenantAdmin).is_ok());
        assert!(matches!(
            ensure_can_assign_role(UserRole::TenantAdmin, UserRole::Admin),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            ensure_can_assign_role(UserRole::Courier, UserRole::Courier),
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();

        assert_ne!(hashed, "segredo123");
        assert!(verify("segredo123", &hashed).unwrap());
    }
}
