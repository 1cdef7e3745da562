use blogdesk::application::list_view::{comments_initial_state, posts_initial_state};
use blogdesk::application::liveness::Liveness;
use blogdesk::application::mutation::MutationController;
use blogdesk::application::resources::ResourceClient;
use blogdesk::config::PostsCmd;
use blogdesk_api_types::Post;

use super::print::print_json;
use super::{CliError, Ctx, delete_and_print, load_editor, run_list, submit_and_print};

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List(args) => {
            let initial = posts_initial_state(ctx.lists.posts_rows_per_page);
            let output = run_list(ctx, ctx.posts(), initial, &args).await?;
            print_json(&output)
        }
        PostsCmd::Show { id, comments } => {
            let form = load_editor(ctx, ctx.posts(), id).await?;
            let initial = comments_initial_state(ctx.lists.comments_rows_per_page, Some(id));
            let comments = run_list(ctx, ctx.comments(), initial, &comments).await?;
            print_json(&serde_json::json!({
                "post": form.draft(),
                "comments": comments,
            }))
        }
        PostsCmd::Create { title, content } => {
            let posts = ctx.posts();
            let resource = posts.resource();
            let draft = Post {
                title,
                content,
                ..Post::default()
            };
            let mut form = MutationController::new(posts, ctx.errors.clone(), Liveness::new(), ctx.actor)
                .with_draft(draft);
            submit_and_print(&mut form, resource).await
        }
        PostsCmd::Update { id, title, content } => {
            let posts = ctx.posts();
            let resource = posts.resource();
            let mut form = load_editor(ctx, posts, id).await?;
            form.edit(|draft| {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(content) = content {
                    draft.content = content;
                }
            });
            submit_and_print(&mut form, resource).await
        }
        PostsCmd::Delete { id, yes } => {
            let target = Post {
                id: Some(id),
                ..Post::default()
            };
            let initial = posts_initial_state(ctx.lists.posts_rows_per_page);
            delete_and_print(ctx, ctx.posts(), initial, target, yes).await
        }
    }
}
