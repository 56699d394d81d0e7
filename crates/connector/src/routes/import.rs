//! Import screens: organization/terminal/city pickers, nomenclature refresh
//! and the import run.

use axum::{Json, Router, extract::State, routing::post};
use iiko_connector_core::{CityId, GroupId, OrganizationId, TerminalGroupId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::validation::{optional_id, optional_name, required_id};
use crate::error::{AppError, LoggedError};
use crate::iiko::{City, OrganizationsResponse, Street, TerminalGroupsResponse};
use crate::import::ImportSummary;
use crate::logs::{Envelope, Logs};
use crate::nomenclature::NomenclatureSummary;
use crate::state::AppState;

/// Picker endpoints answer with the bare iiko payload.
type ListResult<T> = Result<Json<T>, LoggedError>;

/// The import run answers with the `{data, logs}` envelope.
type ApiResult<T> = Result<Json<Envelope<T>>, LoggedError>;

/// Create import routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import/organizations", post(organizations))
        .route("/import/terminals", post(terminals))
        .route("/import/nomenclature", post(nomenclature))
        .route("/import/cities", post(cities))
        .route("/import/streets", post(streets))
        .route("/import/run", post(run))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationRequest {
    pub organization_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NomenclatureRequest {
    pub organization_id: Option<String>,
    pub terminal_id: Option<String>,
    pub organization_name: Option<String>,
    pub terminal_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreetsRequest {
    pub organization_id: Option<String>,
    pub city_id: Option<String>,
    pub city_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunRequest {
    pub chosen_groups: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CitiesData {
    pub cities: Vec<City>,
}

#[derive(Debug, Serialize)]
pub struct StreetsData {
    pub streets: Vec<Street>,
}

#[instrument(skip(state))]
async fn organizations(State(state): State<AppState>) -> ListResult<OrganizationsResponse> {
    let response = state.iiko().organizations().await.map_err(AppError::from)?;

    if response.organizations.is_empty() {
        return Err(AppError::EmptyResponse("Response does not contain organizations.".into()).into());
    }
    Ok(Json(response))
}

#[instrument(skip(state, request))]
async fn terminals(
    State(state): State<AppState>,
    Json(request): Json<OrganizationRequest>,
) -> ListResult<TerminalGroupsResponse> {
    let organization_id = required_id(
        request.organization_id.as_deref(),
        "Organization",
        OrganizationId::parse,
    )?;

    let response = state
        .iiko()
        .terminal_groups(&organization_id)
        .await
        .map_err(AppError::from)?;

    if response.is_empty() {
        return Err(AppError::EmptyResponse("Organization does not have terminals.".into()).into());
    }
    Ok(Json(response))
}

/// Refresh the cached nomenclature and remember the chosen organization and
/// terminal for later exports.
#[instrument(skip(state, request))]
async fn nomenclature(
    State(state): State<AppState>,
    Json(request): Json<NomenclatureRequest>,
) -> ListResult<NomenclatureSummary> {
    let organization_id = required_id(
        request.organization_id.as_deref(),
        "Organization",
        OrganizationId::parse,
    )?;
    let terminal_group_id = optional_id(
        request.terminal_id.as_deref(),
        "Terminal",
        TerminalGroupId::parse,
    )?;

    let summary = state
        .nomenclature()
        .refresh(state.iiko(), &organization_id)
        .await
        .map_err(AppError::from)?;

    let saved = async {
        let mut selection = state.settings().pos_selection().await?;
        if selection.organization_id.as_ref() != Some(&organization_id) {
            selection.city_id = None;
            selection.city_name = None;
        }
        selection.organization_id = Some(organization_id.clone());
        selection.organization_name = optional_name(request.organization_name.as_deref());
        selection.terminal_group_id = terminal_group_id;
        selection.terminal_name = optional_name(request.terminal_name.as_deref());
        state.settings().save_pos_selection(&selection).await
    };
    if let Err(e) = saved.await {
        tracing::error!(error = %e, "Cannot save organization and terminal settings");
    }

    Ok(Json(summary))
}

#[instrument(skip(state, request))]
async fn cities(
    State(state): State<AppState>,
    Json(request): Json<OrganizationRequest>,
) -> ListResult<CitiesData> {
    let organization_id = required_id(
        request.organization_id.as_deref(),
        "Organization",
        OrganizationId::parse,
    )?;

    let response = state
        .iiko()
        .cities(&organization_id)
        .await
        .map_err(AppError::from)?;

    let cities: Vec<City> = response
        .cities
        .into_iter()
        .filter(|c| c.organization_id == organization_id)
        .flat_map(|c| c.items)
        .filter(|city| !city.is_deleted)
        .collect();

    if cities.is_empty() {
        return Err(AppError::EmptyResponse("Organization does not have cities.".into()).into());
    }
    Ok(Json(CitiesData { cities }))
}

/// List the streets of a city and remember the city as the default for
/// address fallbacks.
#[instrument(skip(state, request))]
async fn streets(
    State(state): State<AppState>,
    Json(request): Json<StreetsRequest>,
) -> ListResult<StreetsData> {
    let organization_id = required_id(
        request.organization_id.as_deref(),
        "Organization",
        OrganizationId::parse,
    )?;
    let city_id = required_id(request.city_id.as_deref(), "City", CityId::parse)?;
    let city_name = optional_name(request.city_name.as_deref());

    let response = state
        .iiko()
        .streets(&organization_id, &city_id)
        .await
        .map_err(AppError::from)?;

    let streets: Vec<Street> = response
        .streets
        .into_iter()
        .filter(|street| !street.is_deleted)
        .collect();

    if streets.is_empty() {
        return Err(AppError::EmptyResponse("City does not have streets.".into()).into());
    }

    let saved = async {
        let mut selection = state.settings().pos_selection().await?;
        selection.city_id = Some(city_id.clone());
        selection.city_name = city_name;
        state.settings().save_pos_selection(&selection).await
    };
    if let Err(e) = saved.await {
        tracing::error!(error = %e, "Cannot save city settings");
    }

    Ok(Json(StreetsData { streets }))
}

/// Import chosen groups and their products from the cached nomenclature.
#[instrument(skip(state, request))]
async fn run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> ApiResult<ImportSummary> {
    let chosen: Option<Vec<GroupId>> = request.chosen_groups.map(|ids| {
        ids.iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(GroupId::new)
            .collect()
    });

    let mut logs = Logs::new();
    match state
        .importer()
        .import_nomenclature(chosen.as_deref(), &mut logs)
        .await
    {
        Ok(summary) => Ok(Json(Envelope::new(summary, logs))),
        Err(e) => Err(AppError::from(e).with_logs(logs)),
    }
}
