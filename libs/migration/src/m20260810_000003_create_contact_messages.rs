use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactMessages::Table)
                    .if_not_exists()
                    .col(pk_auto(ContactMessages::Id))
                    .col(string(ContactMessages::Name))
                    .col(string(ContactMessages::Email))
                    .col(string_null(ContactMessages::Phone))
                    .col(string(ContactMessages::Subject))
                    .col(text(ContactMessages::Message))
                    .col(uuid_null(ContactMessages::UserId))
                    .col(boolean(ContactMessages::IsRead).default(false))
                    .col(
                        timestamp_with_time_zone(ContactMessages::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_messages_user")
                            .from(ContactMessages::Table, ContactMessages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ContactMessages {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Subject,
    Message,
    UserId,
    IsRead,
    CreatedAt,
}
