use crate::{
    auth::{
        AuthenticatedUserId, LoginRequest, MessageResponse, PasswordHasher, RegisterRequest,
        TokenResponse, TokenService,
    },
    error::AppError,
    models::UserRead,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use log::{debug, info};
use validator::Validate;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

/// Register a new user
///
/// Stores the username with a bcrypt hash of the password. No token is issued;
/// clients log in afterwards.
///
/// ## Responses:
/// - `200 OK`: `{"msg": "User registered successfully"}`.
/// - `400 Bad Request`: The username is taken ("User already exists").
/// - `422 Unprocessable Entity`: Username or password fails validation.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { username, password } = register_data.into_inner();

    if store.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    // bcrypt blocks the thread
    let hasher = *hasher.get_ref();
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    // A concurrent registration of the same name surfaces as Duplicate(Username).
    let user = store.create_user(&username, &password_hash).await?;
    info!("registered user {} ({})", user.id, user.username);

    Ok(HttpResponse::Ok().json(MessageResponse::new("User registered successfully")))
}

/// Login user
///
/// Exchanges a username and password for a bearer access token.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": "...", "token_type": "bearer"}`.
/// - `401 Unauthorized`: Unknown username or wrong password ("Invalid credentials").
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { username, password } = login_data.into_inner();

    let user = match store.find_user_by_username(&username).await? {
        Some(user) => user,
        None => {
            debug!("login for unknown username {:?}", username);
            return Err(invalid_credentials());
        }
    };

    let hasher = *hasher.get_ref();
    let stored_hash = user.password_hash.clone();
    let valid = web::block(move || hasher.verify(&password, &stored_hash)).await?;
    if !valid {
        debug!("wrong password for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = tokens.issue_access_token(&user.username)?;
    info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// The authenticated caller's own record, without the password hash.
#[get("/me")]
pub async fn me(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = store
        .find_user(user_id.0)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    Ok(HttpResponse::Ok().json(UserRead::from(user)))
}
