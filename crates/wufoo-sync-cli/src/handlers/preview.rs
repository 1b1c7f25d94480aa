//! Preview command handler
//!
//! Reconciles a record against a saved `fields` response without touching
//! the network.

use crate::cli::PreviewArgs;
use crate::config::Config;
use crate::error::Result;
use crate::handlers::utils::{load_fields, load_record};
use crate::output::OutputWriter;

/// Handle the preview command
pub async fn handle_preview(
    args: PreviewArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    output.info(&format!(
        "Previewing {} against {}",
        args.record.display(),
        args.fields.display()
    ))?;

    let record = load_record(&args.record)?;
    let fields = load_fields(&args.fields)?;

    let mut reconciler = config.reconciler();
    if args.no_composite {
        reconciler = reconciler.with_composite_match(false);
    }

    let titles = reconciler.build_title_map(&fields);
    let reconciliation = reconciler.reconcile(&record, &titles);

    tracing::info!(
        matched = reconciliation.matches.len(),
        dropped = reconciliation.dropped.len(),
        "Record reconciled"
    );

    output.reconciliation(&reconciliation)
}
