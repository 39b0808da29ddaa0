use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Authors {
    Table,
    Id,
    UserId,
    Bio,
    Credentials,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    TagColor,
}

#[derive(DeriveIden)]
enum CategoryTranslations {
    Table,
    Id,
    CategoryId,
    Language,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    AuthorId,
    CategoryId,
    Status,
    Publish,
    CreatedAt,
    UpdatedAt,
    Visits,
}

#[derive(DeriveIden)]
enum PostTranslations {
    Table,
    Id,
    PostId,
    Language,
    Title,
    Slug,
    Body,
}

#[derive(DeriveIden)]
enum PostTags {
    Table,
    PostId,
    TagId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    Name,
    Email,
    Body,
    CreatedAt,
    UpdatedAt,
    Active,
}

#[derive(DeriveIden)]
enum PostImages {
    Table,
    Id,
    PostId,
    Name,
    Image,
    SourceOrAuthor,
}

#[derive(DeriveIden)]
enum NewsletterSubscribers {
    Table,
    Id,
    Email,
    CreatedAt,
}

fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pg_trgm")
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid_pk(Users::Id))
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Authors::Table)
                    .if_not_exists()
                    .col(uuid_pk(Authors::Id))
                    .col(ColumnDef::new(Authors::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Authors::Bio).text().not_null().default(""))
                    .col(ColumnDef::new(Authors::Credentials).text().not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authors_user")
                            .from(Authors::Table, Authors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(uuid_pk(Categories::Id))
                    .col(ColumnDef::new(Categories::TagColor).string_len(6).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryTranslations::Table)
                    .if_not_exists()
                    .col(uuid_pk(CategoryTranslations::Id))
                    .col(ColumnDef::new(CategoryTranslations::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(CategoryTranslations::Language).string_len(15).not_null())
                    .col(ColumnDef::new(CategoryTranslations::Name).string_len(100).not_null())
                    .col(ColumnDef::new(CategoryTranslations::Slug).string_len(100).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_translations_category")
                            .from(CategoryTranslations::Table, CategoryTranslations::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_category_translations_language")
                    .table(CategoryTranslations::Table)
                    .col(CategoryTranslations::CategoryId)
                    .col(CategoryTranslations::Language)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(uuid_pk(Tags::Id))
                    .col(ColumnDef::new(Tags::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Tags::Slug).string_len(100).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(uuid_pk(Posts::Id))
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Posts::CategoryId).uuid().null())
                    .col(ColumnDef::new(Posts::Status).string_len(10).not_null().default("draft"))
                    .col(timestamp(Posts::Publish))
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .col(ColumnDef::new(Posts::Visits).big_integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_category")
                            .from(Posts::Table, Posts::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_status_publish")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .col(Posts::Publish)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTranslations::Table)
                    .if_not_exists()
                    .col(uuid_pk(PostTranslations::Id))
                    .col(ColumnDef::new(PostTranslations::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTranslations::Language).string_len(15).not_null())
                    .col(ColumnDef::new(PostTranslations::Title).string_len(250).not_null())
                    .col(ColumnDef::new(PostTranslations::Slug).string_len(250).not_null())
                    .col(ColumnDef::new(PostTranslations::Body).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_translations_post")
                            .from(PostTranslations::Table, PostTranslations::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_post_translations_language")
                    .table(PostTranslations::Table)
                    .col(PostTranslations::PostId)
                    .col(PostTranslations::Language)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_translations_slug")
                    .table(PostTranslations::Table)
                    .col(PostTranslations::Language)
                    .col(PostTranslations::Slug)
                    .to_owned(),
            )
            .await?;

        // Backs the similarity() filter of text search.
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_post_translations_title_trgm \
             ON post_translations USING gin (title gin_trgm_ops)",
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTags::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTags::TagId).uuid().not_null())
                    .primary_key(Index::create().col(PostTags::PostId).col(PostTags::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tags_post")
                            .from(PostTags::Table, PostTags::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tags_tag")
                            .from(PostTags::Table, PostTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(uuid_pk(Comments::Id))
                    .col(ColumnDef::new(Comments::PostId).uuid().not_null())
                    .col(ColumnDef::new(Comments::Name).string_len(80).not_null())
                    .col(ColumnDef::new(Comments::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(timestamp(Comments::CreatedAt))
                    .col(timestamp(Comments::UpdatedAt))
                    .col(ColumnDef::new(Comments::Active).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post")
                            .from(Comments::Table, Comments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_post_created")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostImages::Table)
                    .if_not_exists()
                    .col(uuid_pk(PostImages::Id))
                    .col(ColumnDef::new(PostImages::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostImages::Name).string_len(100).not_null())
                    .col(ColumnDef::new(PostImages::Image).string_len(255).not_null())
                    .col(ColumnDef::new(PostImages::SourceOrAuthor).string_len(200).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_images_post")
                            .from(PostImages::Table, PostImages::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NewsletterSubscribers::Table)
                    .if_not_exists()
                    .col(uuid_pk(NewsletterSubscribers::Id))
                    .col(
                        ColumnDef::new(NewsletterSubscribers::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp(NewsletterSubscribers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first.
        manager
            .drop_table(Table::drop().table(NewsletterSubscribers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostImages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostTranslations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryTranslations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Authors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
