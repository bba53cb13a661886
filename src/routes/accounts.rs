use actix_web::{
    web::{post, scope, Data, Json, ServiceConfig},
    HttpResponse,
};

use crate::services::account::{
    AccountService, ActivationMailer, CredentialStore, PasswordHasher, TokenIssuer,
};
use crate::types::accounts::{PasswordChangeRequest, SignInRequest, SignUpRequest};

use super::error_response;

/// Stand-in for the resolver layer: one JSON route per account operation.
pub fn account_routes<S, H, T, M>(cfg: &mut ServiceConfig)
where
    S: CredentialStore + 'static,
    H: PasswordHasher + 'static,
    T: TokenIssuer + 'static,
    M: ActivationMailer + 'static,
{
    cfg.service(
        scope("/accounts")
            .route("/sign-up", post().to(sign_up::<S, H, T, M>))
            .route("/sign-in", post().to(sign_in::<S, H, T, M>))
            .route("/password-change", post().to(change_password::<S, H, T, M>)),
    );
}

#[tracing::instrument(name = "Handling sign-up", skip(service, req), fields(email = %req.email, step = ?req.step))]
async fn sign_up<S, H, T, M>(
    service: Data<AccountService<S, H, T, M>>,
    req: Json<SignUpRequest>,
) -> HttpResponse
where
    S: CredentialStore,
    H: PasswordHasher,
    T: TokenIssuer,
    M: ActivationMailer,
{
    match service.sign_up(req.into_inner()).await {
        Ok(res) => HttpResponse::Ok().json(res),
        Err(e) => error_response(e),
    }
}

#[tracing::instrument(name = "Handling sign-in", skip(service, req), fields(email = %req.email))]
async fn sign_in<S, H, T, M>(
    service: Data<AccountService<S, H, T, M>>,
    req: Json<SignInRequest>,
) -> HttpResponse
where
    S: CredentialStore,
    H: PasswordHasher,
    T: TokenIssuer,
    M: ActivationMailer,
{
    match service.sign_in(&req.email, &req.password).await {
        Ok(res) => HttpResponse::Ok().json(res),
        Err(e) => error_response(e),
    }
}

#[tracing::instrument(name = "Handling password change", skip(service, req), fields(account_id = %req.account_id))]
async fn change_password<S, H, T, M>(
    service: Data<AccountService<S, H, T, M>>,
    req: Json<PasswordChangeRequest>,
) -> HttpResponse
where
    S: CredentialStore,
    H: PasswordHasher,
    T: TokenIssuer,
    M: ActivationMailer,
{
    let req = req.into_inner();
    match service
        .change_password(req.account_id, &req.old_password, &req.new_password)
        .await
    {
        Ok(res) => HttpResponse::Ok().json(res),
        Err(e) => error_response(e),
    }
}
