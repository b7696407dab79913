use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

use crate::entities::{category, comment, location, post, user};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl Migration {
    async fn create<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        manager
            .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
            .await?;
        for mut index in schema.create_index_from_entity(E::default()) {
            manager.create_index(index.if_not_exists().to_owned()).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // referenced tables first
        Self::create(manager, &schema, user::Entity).await?;
        Self::create(manager, &schema, category::Entity).await?;
        Self::create(manager, &schema, location::Entity).await?;
        Self::create(manager, &schema, post::Entity).await?;
        Self::create(manager, &schema, comment::Entity).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["comments", "posts", "locations", "categories", "users"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
