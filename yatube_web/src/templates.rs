use askama::Template;
use yatube_core::{
    entity::prelude::{GroupModel, UserModel},
    forms::FormErrors,
    pagination::Page,
    service::feeds::{PostCard, PostDetail},
};

/// One `<option>` of the group select.
pub struct GroupOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

impl GroupOption {
    pub fn list(groups: &[GroupModel], selected: &str) -> Vec<GroupOption> {
        groups
            .iter()
            .map(|group| {
                let id = group.id.to_string();
                GroupOption {
                    selected: id == selected,
                    title: group.title.clone(),
                    id,
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub viewer: Option<String>,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub viewer: Option<String>,
    pub group: GroupModel,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<String>,
    pub author: UserModel,
    pub posts_count: u64,
    pub following: bool,
    /// Follow controls are shown to logged-in users on someone else's profile.
    pub can_follow: bool,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Option<String>,
    pub detail: PostDetail,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub viewer: Option<String>,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub viewer: Option<String>,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub struct AboutAuthorTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub struct AboutTechTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "core/500.html")]
pub struct ServerErrorTemplate {
    pub viewer: Option<String>,
}
