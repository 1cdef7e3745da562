use blogdesk::application::list_view::comments_initial_state;
use blogdesk::application::liveness::Liveness;
use blogdesk::application::mutation::MutationController;
use blogdesk::application::resources::ResourceClient;
use blogdesk::config::CommentsCmd;
use blogdesk::domain::drafts::new_comment;
use blogdesk_api_types::Comment;

use super::print::print_json;
use super::{CliError, Ctx, delete_and_print, load_editor, run_list, submit_and_print};

pub async fn handle(ctx: &Ctx, cmd: CommentsCmd) -> Result<(), CliError> {
    match cmd {
        CommentsCmd::List { post_id, list } => {
            let initial = comments_initial_state(ctx.lists.comments_rows_per_page, post_id);
            let output = run_list(ctx, ctx.comments(), initial, &list).await?;
            print_json(&output)
        }
        CommentsCmd::Show { id } => {
            let form = load_editor(ctx, ctx.comments(), id).await?;
            print_json(&form.draft())
        }
        CommentsCmd::Create { post_id, content } => {
            let comments = ctx.comments();
            let resource = comments.resource();
            let mut form =
                MutationController::new(comments, ctx.errors.clone(), Liveness::new(), ctx.actor)
                    .with_draft(new_comment(post_id));
            form.edit(|draft| draft.content = content);
            submit_and_print(&mut form, resource).await
        }
        CommentsCmd::Update { id, content } => {
            let comments = ctx.comments();
            let resource = comments.resource();
            let mut form = load_editor(ctx, comments, id).await?;
            if let Some(content) = content {
                form.edit(|draft| draft.content = content);
            }
            submit_and_print(&mut form, resource).await
        }
        CommentsCmd::Delete { id, yes } => {
            let target = Comment {
                id: Some(id),
                ..Comment::default()
            };
            let initial = comments_initial_state(ctx.lists.comments_rows_per_page, None);
            delete_and_print(ctx, ctx.comments(), initial, target, yes).await
        }
    }
}
