// SeaORM entities backing the content store.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod session;
pub mod user;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comment,
        Model as CommentModel,
    };
    pub use super::follow::{
        ActiveModel as FollowActiveModel, Column as FollowColumn, Entity as Follow,
        Model as FollowModel,
    };
    pub use super::group::{
        ActiveModel as GroupActiveModel, Column as GroupColumn, Entity as Group,
        Model as GroupModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post,
        Model as PostModel,
    };
    pub use super::session::{
        ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as Session,
        Model as SessionModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User,
        Model as UserModel,
    };

    pub use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
        QuerySelect, Set,
    };
}
