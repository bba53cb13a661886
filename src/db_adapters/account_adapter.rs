use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::account::{ActiveModel, Column, Entity, Model};
use crate::services::account::{CreateAccountParams, CredentialStore};
use crate::types::{accounts::AccountCredentials, StoreError};

/// SeaORM-backed [`CredentialStore`].
#[derive(Clone)]
pub struct AccountAdapter {
    db: DbConn,
}

impl AccountAdapter {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

impl CredentialStore for AccountAdapter {
    async fn create(&self, params: CreateAccountParams) -> Result<Model, StoreError> {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(params.email),
            first_name: Set(params.first_name),
            last_name: Set(params.last_name),
            phone: Set(params.phone),
            password_hash: Set(params.password_hash),
            password_salt: Set(params.password_salt),
            role: Set(params.role),
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::DuplicateKey,
            _ => StoreError::Db(e),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Model>, StoreError> {
        Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(StoreError::Db)
    }

    async fn find_credentials_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AccountCredentials>, StoreError> {
        Entity::find_by_id(id)
            .select_only()
            .column(Column::Id)
            .column(Column::PasswordHash)
            .column(Column::PasswordSalt)
            .into_tuple::<(Uuid, String, String)>()
            .one(&self.db)
            .await
            .map(|row| {
                row.map(|(id, password_hash, password_salt)| AccountCredentials {
                    id,
                    password_hash,
                    password_salt,
                })
            })
            .map_err(StoreError::Db)
    }

    async fn update_last_login(
        &self,
        id: Uuid,
        logged_in_at: sea_orm::entity::prelude::DateTimeWithTimeZone,
    ) -> Result<Model, StoreError> {
        let account = self.get_by_id(id).await?;
        let mut account = account.into_active_model();
        account.last_login_at = Set(Some(logged_in_at));
        account.updated_at = Set(Utc::now().into());
        account.update(&self.db).await.map_err(StoreError::Db)
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> Result<Model, StoreError> {
        let account = self.get_by_id(id).await?;
        let mut account = account.into_active_model();
        account.password_hash = Set(password_hash);
        account.updated_at = Set(Utc::now().into());
        account.update(&self.db).await.map_err(StoreError::Db)
    }
}

impl AccountAdapter {
    async fn get_by_id(&self, id: Uuid) -> Result<Model, StoreError> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StoreError::Db)?
            .ok_or_else(|| {
                StoreError::Db(DbErr::RecordNotFound(format!("account {} not found", id)))
            })
    }
}
