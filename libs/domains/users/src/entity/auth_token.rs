use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub user_id: Uuid,
    pub last_used_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::token::AuthToken {
    fn from(model: Model) -> Self {
        Self {
            token: model.token,
            user_id: model.user_id,
            last_used_at: model.last_used_at.into(),
        }
    }
}

impl From<crate::token::AuthToken> for ActiveModel {
    fn from(token: crate::token::AuthToken) -> Self {
        ActiveModel {
            token: Set(token.token),
            user_id: Set(token.user_id),
            last_used_at: Set(token.last_used_at.into()),
        }
    }
}
