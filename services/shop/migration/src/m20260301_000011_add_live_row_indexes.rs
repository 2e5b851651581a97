use sea_orm_migration::prelude::*;

/// Uniqueness that only applies to rows that are not soft-deleted, plus lookup
/// indexes for the foreign keys the service filters on.
#[derive(DeriveMigrationName)]
pub struct Migration;

const PARTIAL_UNIQUE: &[(&str, &str)] = &[
    (
        "uq_users_email_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_users_email_live ON users (email) WHERE deleted_at IS NULL",
    ),
    (
        "uq_categories_name_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_categories_name_live ON categories (name) WHERE deleted_at IS NULL",
    ),
    (
        "uq_products_sku_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_products_sku_live ON products (sku) WHERE deleted_at IS NULL AND sku IS NOT NULL",
    ),
    (
        "uq_reviews_user_product_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_reviews_user_product_live ON reviews (user_id, product_id) WHERE deleted_at IS NULL",
    ),
    (
        "uq_addresses_default_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_addresses_default_live ON addresses (user_id) WHERE is_default AND deleted_at IS NULL",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (_, sql) in PARTIAL_UNIQUE {
            db.execute_unprepared(sql).await?;
        }

        manager
            .create_index(
                Index::create()
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .name("idx_products_category_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Images::Table)
                    .col(Images::ProductId)
                    .name("idx_images_product_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .name("idx_orders_user_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .name("idx_order_items_order_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Reviews::Table)
                    .col(Reviews::ProductId)
                    .name("idx_reviews_product_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Addresses::Table)
                    .col(Addresses::UserId)
                    .name("idx_addresses_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_addresses_user_id",
            "idx_reviews_product_id",
            "idx_order_items_order_id",
            "idx_orders_user_id",
            "idx_images_product_id",
            "idx_products_category_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        for (name, _) in PARTIAL_UNIQUE.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Products {
    Table,
    CategoryId,
}

#[derive(Iden)]
enum Images {
    Table,
    ProductId,
}

#[derive(Iden)]
enum Orders {
    Table,
    UserId,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    OrderId,
}

#[derive(Iden)]
enum Reviews {
    Table,
    ProductId,
}

#[derive(Iden)]
enum Addresses {
    Table,
    UserId,
}
