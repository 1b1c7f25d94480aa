//! Push command handler

use crate::cli::PushArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::load_record;
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, PushReport};
use wufoo_sync_core::{EntrySync, FormClient, MemoryRecord, SaveOutcome};

/// Model name given to records pushed straight to a form
const UNNAMED_MODEL: &str = "Record";

/// Handle the push command
///
/// A rejected entry is reported like any other result and then surfaces as
/// [`Error::Rejected`] so the process exits with a distinct code.
pub async fn handle_push(
    args: PushArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let data = load_record(&args.record)?;
    let sync = config.entry_sync(config.client()?);

    let alias = args.model.as_deref().unwrap_or(UNNAMED_MODEL);
    let mut record = MemoryRecord::from_data(alias, data);

    let report = push_record(&sync, &args, &mut record, output).await?;
    output.push_report(&report)?;

    match report.outcome {
        SaveOutcome::Saved { .. } => Ok(()),
        SaveOutcome::Rejected { invalid_fields, .. } => Err(Error::Rejected {
            form: report.form,
            fields: invalid_fields,
        }),
    }
}

/// Submit one record through the save hook
///
/// With `--model` the record goes through the model's save hook; with
/// `--form` it is submitted to that form directly and the field mapping is
/// reported along with the outcome.
pub async fn push_record<C: FormClient>(
    sync: &EntrySync<C>,
    args: &PushArgs,
    record: &mut MemoryRecord,
    output: &OutputWriter,
) -> Result<PushReport> {
    let created = !args.update;
    let form = match (&args.form, &args.model) {
        (Some(form), _) => form.clone(),
        (None, Some(model)) => sync.form_for(model)?.to_string(),
        (None, None) => return Err(Error::config("Either --form or --model is required")),
    };

    let timer = Timer::with_details("push", &form);
    let progress = output.spinner(&format!("Submitting entry to form '{}'...", form));

    let result = match &args.form {
        Some(form) => {
            tracing::debug!(form = %form, created, "Submitting record to form");
            sync.save_to_form(form, record)
                .await
                .map(|report| (report.outcome, Some(report.reconciliation)))
        }
        None => sync
            .before_save(record, created)
            .await
            .map(|outcome| (outcome, None)),
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    tracing::debug!(elapsed_ms = timer.elapsed().as_millis() as u64, "Push finished");

    let (outcome, reconciliation) = result?;
    Ok(PushReport {
        form,
        model: args.model.clone(),
        created,
        outcome,
        reconciliation,
        validation_errors: record.validation_errors().clone(),
    })
}
