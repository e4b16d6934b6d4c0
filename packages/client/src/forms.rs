//! Form submission.
//!
//! The form is locked for the whole submission and unlocked when it ends,
//! whatever the outcome. A `GOTO` form only navigates; `GET` and `POST` forms
//! expect either a `FormResponse` (200) whose event is then fired, or a
//! validation error list (422) attached to the fields by name.

use crate::error::{ClientError, ClientResult};
use crate::request::{RequestArgs, Requester};
use crate::transport::FilePart;
use sdui_model::component::FormMethod;
use sdui_model::forms::{ValidationErrorBody, FORM_RESPONSE_TYPE};
use sdui_model::{loc_to_name, FormResponse};
use sdui_renderer::{ErrorDetails, UiState};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Field values in form order, as `(name, value)` pairs
pub type FormValues = Vec<(String, String)>;

/// Message shown when a 422 carries no field errors
pub const GENERIC_FORM_ERROR: &str = "Error submitting form";

pub async fn submit(requester: &Requester, state: &UiState, key: &str, values: FormValues) -> ClientResult<()> {
    submit_with_files(requester, state, key, values, Vec::new()).await
}

/// Submit a form holding file fields. Files only travel with `POST` forms,
/// which are then sent as `multipart/form-data`.
#[instrument(skip_all, fields(form = key, files = files.len()))]
pub async fn submit_with_files(
    requester: &Requester,
    state: &UiState,
    key: &str,
    values: FormValues,
    files: Vec<FilePart>,
) -> ClientResult<()> {
    let target = state
        .forms
        .target(key)
        .ok_or_else(|| ClientError::UnknownForm(key.to_string()))?;
    let _guard = state
        .forms
        .begin_submit(key)
        .ok_or_else(|| ClientError::FormBusy(key.to_string()))?;

    if !files.is_empty() && target.method != FormMethod::Post {
        warn!(method = ?target.method, "Ignoring file fields of a non-POST form");
    }
    let args = match target.method {
        FormMethod::Goto => {
            let url = goto_url(&target.submit_url, &values);
            debug!(url = %url, "Form navigates");
            state.navigation.goto(&url);
            return Ok(());
        }
        FormMethod::Get => RequestArgs::get(&target.submit_url).with_query(values),
        FormMethod::Post => RequestArgs::post_form(&target.submit_url, values).with_files(files),
    };

    let (status, data) = requester.request(args.expect(&[200, 422])).await?;
    if status == 200 {
        let response = form_response(data).map_err(|err| {
            state
                .errors
                .set(Some(ErrorDetails::new("Invalid Server Response", err.to_string())));
            err
        })?;
        state.dispatcher().fire(Some(&response.event));
        return Ok(());
    }

    match field_errors(data) {
        Some(errors) => {
            debug!(count = errors.len(), "Form validation errors");
            state.forms.set_field_errors(key, errors);
        }
        None => {
            warn!("Non-field error submitting form");
            state.forms.set_error(key, Some(GENERIC_FORM_ERROR.to_string()));
        }
    }
    Ok(())
}

/// `submit_url?<fields>` with empty values dropped
fn goto_url(submit_url: &str, values: &FormValues) -> String {
    let non_empty: Vec<&(String, String)> = values.iter().filter(|(_, value)| !value.is_empty()).collect();
    if non_empty.is_empty() {
        return submit_url.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(non_empty)
        .finish();
    format!("{}?{}", submit_url, query)
}

fn form_response(data: Value) -> ClientResult<FormResponse> {
    if data.get("type").and_then(Value::as_str) != Some(FORM_RESPONSE_TYPE) {
        return Err(ClientError::Protocol(format!("Expected FormResponse, got {}", data)));
    }
    serde_json::from_value(data.clone())
        .map_err(|err| ClientError::Protocol(format!("Invalid FormResponse {}: {}", data, err)))
}

/// Field errors of a 422 body, `None` when it has no `detail.form` list
fn field_errors(data: Value) -> Option<HashMap<String, String>> {
    let body: ValidationErrorBody = serde_json::from_value(data).ok()?;
    let errors = body.detail.form?;
    Some(
        errors
            .into_iter()
            .map(|error| (loc_to_name(&error.loc), error.msg))
            .collect(),
    )
}
