/// 사용자 계정
/// 1. 회원 가입
/// 2. 로그인 (요청 컨텍스트 발급)
// region:    --- Imports
use crate::auction::model::UserId;
use crate::error::{AuctionError, ValidationErrors};
use crate::store::{StoreError, UserStore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

const MIN_CREDENTIAL_LENGTH: usize = 5;

// region:    --- Models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(format!("알 수 없는 역할: {}", other)),
        }
    }
}

/// 사용자 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// 저장소에 기록할 사용자 (비밀번호는 이미 해시됨)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
}

/// 회원 가입 요청
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password: String,
    pub role: Role,
}

/// 요청 컨텍스트
/// 외부 세션 계층이 인증된 사용자의 id 와 역할만 담아 각 호출에 넘긴다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: UserId,
    pub role: Role,
}

impl RequestContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for RequestContext {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}
// endregion: --- Models

// region:    --- Password & Validation
/// 비밀번호 해시 (SHA-256, hex)
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// 회원 가입 검증 (위반된 필드를 모두 수집)
pub fn validate_registration(registration: &Registration) -> Result<(), AuctionError> {
    let mut errors = ValidationErrors::new();

    if registration.name.trim().is_empty() {
        errors.reject("name", "field.required", "Name is required");
    }
    if registration.surname.trim().is_empty() {
        errors.reject("surname", "field.required", "Surname is required");
    }
    if registration.login.trim().is_empty() {
        errors.reject("login", "field.required", "Login is required");
    } else if registration.login.chars().count() < MIN_CREDENTIAL_LENGTH {
        errors.reject(
            "login",
            "field.min.length",
            "Login must be at least 5 characters long",
        );
    }
    if registration.password.trim().is_empty() {
        errors.reject("password", "field.required", "Password is required");
    } else if registration.password.chars().count() < MIN_CREDENTIAL_LENGTH {
        errors.reject(
            "password",
            "field.min.length",
            "Password must be at least 5 characters long",
        );
    }

    errors.into_result()
}
// endregion: --- Password & Validation

// region:    --- Account Service
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// 1. 회원 가입
    pub async fn register(&self, registration: Registration) -> Result<User, AuctionError> {
        info!(
            "{:<12} --> 회원 가입 요청 login: {}",
            "Account", registration.login
        );
        validate_registration(&registration)?;

        let new_user = NewUser {
            name: registration.name,
            surname: registration.surname,
            password_hash: hash_password(&registration.password),
            login: registration.login,
            role: registration.role,
        };

        match self.users.insert_user(new_user).await {
            Ok(user) => Ok(user),
            Err(StoreError::LoginTaken(login)) => {
                warn!("{:<12} --> 이미 사용 중인 로그인: {}", "Account", login);
                Err(AuctionError::LoginTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 2. 로그인
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<RequestContext, AuctionError> {
        let user = self
            .users
            .find_user_by_login(login)
            .await?
            .filter(|user| user.password_hash == hash_password(password))
            .ok_or(AuctionError::InvalidCredentials)?;

        info!("{:<12} --> 로그인 성공 user: {}", "Account", user.id);
        Ok(RequestContext::from(&user))
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AuctionError> {
        self.users
            .find_user(id)
            .await?
            .ok_or(AuctionError::NotFound {
                entity: "사용자",
                id,
            })
    }
}
// endregion: --- Account Service
