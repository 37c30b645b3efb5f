//! Review database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Review, ReviewStyle};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub review: String,
    pub language: String,
    pub review_style: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// An unrecognized language in storage falls back to the default rather
/// than failing the whole query.
impl From<Model> for Review {
    fn from(model: Model) -> Self {
        Review {
            id: model.id,
            user_id: model.user_id,
            code: model.code,
            review: model.review,
            language: model.language.parse().unwrap_or_default(),
            review_style: model
                .review_style
                .as_deref()
                .and_then(|s| match s {
                    "detailed" => Some(ReviewStyle::Detailed),
                    "concise" => Some(ReviewStyle::Concise),
                    _ => None,
                }),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
