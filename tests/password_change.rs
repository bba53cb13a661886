use actix_web::{http, test};
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait};
use serde_json::Value;
use uuid::Uuid;

use mfa_accounts_backend::entities::account;
use mfa_accounts_backend::types::accounts::{PasswordChangeRequest, SignInRequest};

use crate::utils::{factory, init_app, Connections, TEST_PASSWORD, TEST_PASSWORD_SALT};

mod utils;

async fn post_password_change<S>(
    app: &S,
    account_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> actix_web::dev::ServiceResponse
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/accounts/password-change")
        .set_json(PasswordChangeRequest {
            account_id,
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })
        .to_request();
    test::call_service(app, req).await
}

#[actix_web::test]
async fn happy_path_keeps_the_salt() -> Result<(), DbErr> {
    let Connections { app, db, .. } = init_app().await?;
    let account = factory::account().insert(&db).await?;
    let hash_before = account.password_hash.clone();

    let res = post_password_change(&app, account.id, TEST_PASSWORD, "brand-new-pw").await;
    assert_eq!(res.status(), http::StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["user"]["email"], account.email);
    assert!(body["user"].get("password_hash").is_none());

    let stored = account::Entity::find_by_id(account.id)
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(stored.password_salt, TEST_PASSWORD_SALT);
    assert_ne!(stored.password_hash, hash_before);

    // The old password no longer verifies; the new one does.
    let req = test::TestRequest::post()
        .uri("/accounts/sign-in")
        .set_json(SignInRequest {
            email: account.email.clone(),
            password: TEST_PASSWORD.to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/accounts/sign-in")
        .set_json(SignInRequest {
            email: account.email.clone(),
            password: "brand-new-pw".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    Ok(())
}

mod errors {
    use super::*;

    #[actix_web::test]
    async fn wrong_old_password_is_401() -> Result<(), DbErr> {
        let Connections { app, db, .. } = init_app().await?;
        let account = factory::account().insert(&db).await?;

        let res = post_password_change(&app, account.id, "not-the-password", "brand-new-pw").await;

        assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], 401);
        assert_eq!(body["error"], "Wrong password");
        Ok(())
    }

    #[actix_web::test]
    async fn unknown_account_is_401() -> Result<(), DbErr> {
        let Connections { app, .. } = init_app().await?;

        let res = post_password_change(&app, Uuid::now_v7(), TEST_PASSWORD, "brand-new-pw").await;

        assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
