//! Nomenclature import commands.
//!
//! The nomenclature cache lives in process memory, so `run` fetches the
//! nomenclature itself before importing.

use std::time::Duration;

use iiko_connector::logs::{Envelope, Logs};
use iiko_connector::nomenclature::NomenclatureCache;
use iiko_connector::store::SettingsStore;
use iiko_connector_core::{GroupId, OrganizationId, TerminalGroupId};

use super::{CommandError, connect, iiko_client, print_envelope};

const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Fetch the nomenclature of an organization and save the selection.
pub async fn refresh(organization: &str, terminal: Option<&str>) -> Result<(), CommandError> {
    let organization_id = OrganizationId::parse(organization)
        .map_err(|e| CommandError::InvalidArgument(format!("Organization ID: {e}")))?;
    let terminal_group_id = terminal
        .map(TerminalGroupId::parse)
        .transpose()
        .map_err(|e| CommandError::InvalidArgument(format!("Terminal ID: {e}")))?;

    let store = connect().await?;
    let (iiko, _) = iiko_client()?;

    let cache = NomenclatureCache::new(CACHE_TTL);
    let summary = cache.refresh(&iiko, &organization_id).await?;

    let mut selection = store.pos_selection().await?;
    if selection.organization_id.as_ref() != Some(&organization_id) {
        selection.organization_name = None;
        selection.city_id = None;
        selection.city_name = None;
    }
    selection.organization_id = Some(organization_id);
    if terminal_group_id.is_some() {
        selection.terminal_name = None;
    }
    selection.terminal_group_id = terminal_group_id;
    store.save_pos_selection(&selection).await?;

    print_envelope(&Envelope::new(summary, Logs::new()))
}

/// Import the given groups, or the saved selection when none are given.
pub async fn run(groups: &[String]) -> Result<(), CommandError> {
    let store = connect().await?;
    let (iiko, config) = iiko_client()?;

    let organization_id = store
        .pos_selection()
        .await?
        .organization_id
        .or(config.organization_id)
        .ok_or_else(|| {
            CommandError::InvalidArgument(
                "No organization selected. Run `import refresh` or set IIKO_ORGANIZATION_ID."
                    .to_string(),
            )
        })?;

    let cache = NomenclatureCache::new(CACHE_TTL);
    cache.refresh(&iiko, &organization_id).await?;

    let chosen: Vec<GroupId> = groups
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(GroupId::new)
        .collect();

    let importer = iiko_connector::import::Importer::new(&cache, &store, &store);
    let mut logs = Logs::new();
    match importer
        .import_nomenclature(Some(chosen.as_slice()), &mut logs)
        .await
    {
        Ok(summary) => print_envelope(&Envelope::new(summary, logs)),
        Err(e) => {
            print_envelope(&Envelope::<()>::failed(logs))?;
            Err(e.into())
        }
    }
}
