use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len(Users::Username, 32))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::Active).default(false))
                    .col(string_len_null(Users::ActivationToken, 64))
                    .col(string_len_null(Users::PasswordResetToken, 64))
                    .col(timestamp_with_time_zone_null(Users::PasswordResetRequestedAt))
                    .col(string_null(Users::Image))
                    .col(timestamp_with_time_zone(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Users::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Listing pages through active users in creation order.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_active_created_at")
                    .table(Users::Table)
                    .col(Users::Active)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_activation_token")
                    .table(Users::Table)
                    .col(Users::ActivationToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_password_reset_token")
                    .table(Users::Table)
                    .col(Users::PasswordResetToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Active,
    ActivationToken,
    PasswordResetToken,
    PasswordResetRequestedAt,
    Image,
    CreatedAt,
    UpdatedAt,
}
