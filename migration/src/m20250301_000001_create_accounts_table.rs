use sea_orm_migration::{
    prelude::{extension::postgres::Type, *},
    schema::{
        enumeration, string, string_uniq, timestamp_with_time_zone,
        timestamp_with_time_zone_null, uuid,
    },
    sea_orm::{DbBackend, EnumIter, Iterable},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == DbBackend::Postgres {
            manager
                .create_type(
                    Type::create()
                        .as_enum(RoleEnum)
                        .values(RoleVariants::iter())
                        .to_owned(),
                )
                .await?;
        }
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(uuid(Account::Id).primary_key())
                    .col(string_uniq(Account::Email))
                    .col(string(Account::FirstName))
                    .col(string(Account::LastName))
                    .col(string(Account::Phone))
                    .col(string(Account::PasswordHash))
                    .col(string(Account::PasswordSalt))
                    .col(
                        enumeration(Account::Role, RoleEnum, RoleVariants::iter())
                            .default(RoleVariants::Viewer.to_string()),
                    )
                    .col(timestamp_with_time_zone_null(Account::LastLoginAt))
                    .col(
                        timestamp_with_time_zone(Account::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Account::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        if manager.get_database_backend() == DbBackend::Postgres {
            manager
                .drop_type(Type::drop().if_exists().name(RoleEnum).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Phone,
    PasswordHash,
    PasswordSalt,
    Role,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
struct RoleEnum;

#[derive(DeriveIden, EnumIter)]
enum RoleVariants {
    #[sea_orm(iden = "VIEWER")]
    Viewer,
    #[sea_orm(iden = "PUBLISHER")]
    Publisher,
}
