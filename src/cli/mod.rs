//! Command handlers driving the engine from the terminal.

mod comments;
mod ctx;
mod posts;
mod print;

use std::collections::BTreeSet;
use std::sync::Arc;

use blogdesk::application::delete::{DeleteDialog, DeleteOutcome};
use blogdesk::application::fetcher::FetchOutcome;
use blogdesk::application::list_view::ListView;
use blogdesk::application::liveness::Liveness;
use blogdesk::application::pagination::ROWS_PER_PAGE_OPTIONS;
use blogdesk::application::mutation::{EditorState, MutationController, SubmitOutcome};
use blogdesk::application::query::{QUERY_FILTER, QueryState, is_column_visible};
use blogdesk::application::resources::ResourceClient;
use blogdesk::config::{Command, ListArgs};
use blogdesk::domain::types::RecordId;
use blogdesk::domain::validation::ValidationErrors;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

pub use ctx::{CliError, Ctx};
pub use print::print_lines;

use print::print_json;

pub async fn dispatch(ctx: &Ctx, command: Command) -> Result<(), CliError> {
    match command {
        Command::Posts(cmd) => posts::handle(ctx, cmd).await,
        Command::Comments(cmd) => comments::handle(ctx, cmd).await,
    }
}

/// One rendered page of a list.
#[derive(Debug, Serialize)]
pub(crate) struct ListOutput {
    items: Vec<Value>,
    count: u64,
    page: u32,
    rows_per_page: u32,
    rows_per_page_options: [u32; 3],
    max_page: u64,
}

/// Apply the list flags as store transitions (filters, sort, rows per page,
/// then page), fetch, and bound the page once the total is known.
pub(crate) async fn run_list<C: ResourceClient>(
    ctx: &Ctx,
    client: Arc<C>,
    initial: QueryState,
    args: &ListArgs,
) -> Result<ListOutput, CliError> {
    let resource = client.resource();
    let view = ListView::new(client, ctx.errors.clone(), initial);
    let store = view.store();

    if let Some(query) = args.query.as_ref() {
        let mut filters = store.snapshot().filters().clone();
        filters.insert(QUERY_FILTER.to_string(), query.as_str().into());
        store.change_filters(filters);
    }
    if args.sort_by.is_some() || args.sort_dir.is_some() {
        let current = store.snapshot();
        let sort_by = args
            .sort_by
            .clone()
            .unwrap_or_else(|| current.sort_by().to_string());
        store.change_sort(sort_by, args.sort_dir.unwrap_or(current.sort_dir()));
    }
    if let Some(rows) = args.rows_per_page {
        store.change_rows_per_page(rows);
    }
    if let Some(page) = args.page {
        store.change_page(page);
    }
    if let Some(columns) = args.columns.as_ref() {
        store.change_visible_columns(Some(columns.iter().cloned().collect::<BTreeSet<_>>()));
    }

    fetch_or_fail(&view, resource).await?;

    let requested = store.snapshot().page();
    let bounded = view.controls().clamp(requested);
    if bounded != requested {
        info!(resource, requested = requested.get(), bounded = bounded.get(), "page past the end");
        store.change_page(bounded);
        fetch_or_fail(&view, resource).await?;
    }

    let state = store.snapshot();
    let snapshot = view.snapshot();
    let items = snapshot
        .items
        .iter()
        .map(|record| project(record, state.visible_columns()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListOutput {
        items,
        count: snapshot.count,
        page: state.page().get(),
        rows_per_page: state.rows_per_page().get(),
        rows_per_page_options: ROWS_PER_PAGE_OPTIONS,
        max_page: view.controls().max_page(),
    })
}

async fn fetch_or_fail<C: ResourceClient>(
    view: &ListView<C>,
    resource: &'static str,
) -> Result<(), CliError> {
    match view.refresh().await {
        FetchOutcome::Applied => Ok(()),
        FetchOutcome::Failed | FetchOutcome::Discarded => Err(CliError::Request {
            resource,
            operation: "list",
        }),
    }
}

/// Serialize a row, keeping only the visible columns.
fn project<R: Serialize>(record: &R, visible: Option<&BTreeSet<String>>) -> Result<Value, CliError> {
    let value = serde_json::to_value(record).map_err(|err| CliError::Output(err.to_string()))?;
    match value {
        Value::Object(fields) => Ok(Value::Object(
            fields
                .into_iter()
                .filter(|(name, _)| is_column_visible(name, visible))
                .collect::<Map<_, _>>(),
        )),
        other => Ok(other),
    }
}

/// Load the record behind an edit screen, failing when it cannot be found.
pub(crate) async fn load_editor<C: ResourceClient>(
    ctx: &Ctx,
    client: Arc<C>,
    id: RecordId,
) -> Result<MutationController<C>, CliError> {
    let resource = client.resource();
    let mut form = MutationController::new(client, ctx.errors.clone(), Liveness::new(), ctx.actor);
    match form.hydrate(Some(id)).await {
        EditorState::Ready(_) => Ok(form),
        EditorState::Loading | EditorState::NotFound => Err(CliError::NotFound { resource, id }),
    }
}

/// Submit the form and print where the admin would be sent next.
pub(crate) async fn submit_and_print<C: ResourceClient>(
    form: &mut MutationController<C>,
    resource: &'static str,
) -> Result<(), CliError> {
    match form.submit().await {
        SubmitOutcome::Saved {
            record,
            destination,
        } => print_json(&serde_json::json!({
            "record": record,
            "redirect": destination.path(),
        })),
        SubmitOutcome::Invalid(validation) => {
            print_lines(&validation_lines(&validation));
            Err(CliError::Invalid { resource })
        }
        SubmitOutcome::Failed(_) | SubmitOutcome::Skipped => Err(CliError::Request {
            resource,
            operation: "save",
        }),
    }
}

fn validation_lines(validation: &ValidationErrors) -> Vec<String> {
    validation
        .iter()
        .map(|(_, message)| message.to_string())
        .collect()
}

/// Delete `record` through the list's confirmation dialog. Without `confirmed`
/// the dialog is cancelled and nothing is sent.
pub(crate) async fn delete_and_print<C: ResourceClient>(
    ctx: &Ctx,
    client: Arc<C>,
    initial: QueryState,
    record: C::Record,
    confirmed: bool,
) -> Result<(), CliError> {
    let resource = client.resource();
    let view = ListView::new(client, ctx.errors.clone(), initial);
    let flow = view.delete_flow();
    let mut dialog = DeleteDialog::new();
    dialog.open(record);

    let outcome = if confirmed {
        flow.confirm(&mut dialog).await
    } else {
        flow.cancel(&mut dialog)
    };

    match outcome {
        DeleteOutcome::Deleted(id) => {
            // The flow has already sent the list back to page 1.
            let count = match view.refresh().await {
                FetchOutcome::Applied => Some(view.snapshot().count),
                FetchOutcome::Failed | FetchOutcome::Discarded => None,
            };
            print_json(&serde_json::json!({ "deleted": id, "count": count }))
        }
        DeleteOutcome::Cancelled => {
            print_lines(&["Delete cancelled; pass --yes to confirm.".to_string()]);
            Ok(())
        }
        DeleteOutcome::Skipped | DeleteOutcome::Failed(_) => Err(CliError::Request {
            resource,
            operation: "delete",
        }),
    }
}
