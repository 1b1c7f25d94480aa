//! Fields command handler

use crate::cli::FieldsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{FieldsReport, OutputWriter};
use wufoo_sync_core::{FieldReconciler, FormClient};

/// Handle the fields command
pub async fn handle_fields(
    args: FieldsArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let client = config.client()?;
    let report = fetch_fields(&client, &config.reconciler(), &args.form, output).await?;
    output.fields_report(&report)
}

/// Fetch a form's descriptors and build its title map
pub async fn fetch_fields<C: FormClient>(
    client: &C,
    reconciler: &FieldReconciler,
    form: &str,
    output: &OutputWriter,
) -> Result<FieldsReport> {
    let _timer = Timer::with_details("fields", form);

    let progress = output.spinner(&format!("Fetching fields of form '{}'...", form));
    let fields = client.find_fields(form).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let fields = fields?;
    let titles = reconciler.build_title_map(&fields);
    tracing::info!(form = %form, fields = fields.len(), titles = titles.len(), "Fetched form fields");

    Ok(FieldsReport {
        form: form.to_string(),
        fields,
        titles,
    })
}
