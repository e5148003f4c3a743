//! Fixture registry shared by the query tests.

use crate::catalog::{Association, ModelDef, Nature, SchemaBundle};

/// Blog schema:
///
/// - `Article.author` -> `User` (one, many-to-one)
/// - `Article.comments` -> `Comment` (many, one-to-many)
/// - `Article.tags` -> `Tag` (many, many-to-many, dominant)
/// - `Article.cover` -> `upload.file` (one, polymorphic)
/// - `Article.category` -> `Category` (one, auto-populated)
/// - `Article.legacy` -> `Missing` (target not registered)
/// - `User.articles`, `User.profile`, `Comment.article`, `Comment.author`,
///   `Tag.articles`
pub(crate) fn blog_schema() -> SchemaBundle {
    let article = ModelDef::new("Article", "articles")
        .with_association(
            Association::one("author", "User")
                .with_nature(Nature::ManyToOne)
                .with_via("articles"),
        )
        .with_association(
            Association::many("comments", "Comment")
                .with_nature(Nature::OneToMany)
                .with_via("article"),
        )
        .with_association(
            Association::many("tags", "Tag")
                .with_nature(Nature::ManyToMany)
                .dominant()
                .with_via("articles"),
        )
        .with_association(
            Association::one("cover", "file")
                .in_namespace("upload")
                .with_via("related")
                .with_discriminator("field"),
        )
        .with_association(Association::one("category", "Category").auto_populated())
        .with_association(Association::one("legacy", "Missing"));

    let user = ModelDef::new("User", "users")
        .with_association(
            Association::many("articles", "Article")
                .with_nature(Nature::OneToMany)
                .with_via("author"),
        )
        .with_association(Association::one("profile", "Profile").auto_populated());

    let comment = ModelDef::new("Comment", "comments")
        .with_association(
            Association::one("article", "Article")
                .with_nature(Nature::ManyToOne)
                .with_via("comments"),
        )
        .with_association(Association::one("author", "User"));

    let tag = ModelDef::new("Tag", "tags").with_association(
        Association::many("articles", "Article")
            .with_nature(Nature::ManyToMany)
            .with_via("tags"),
    );

    SchemaBundle::new(1)
        .with_model(article)
        .with_model(user)
        .with_model(comment)
        .with_model(tag)
        .with_model(ModelDef::new("Category", "categories"))
        .with_model(ModelDef::new("Profile", "profiles"))
        .with_model(ModelDef::new("file", "upload_file").in_namespace("upload"))
}
