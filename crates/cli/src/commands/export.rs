//! Manual order export commands.

use iiko_connector::config::DeliveryDefaults;
use iiko_connector::delivery::DefaultHooks;
use iiko_connector::export::{ExportDefaults, Exporter};
use iiko_connector::logs::{Envelope, Logs};
use iiko_connector_core::OrderId;

use super::{CommandError, connect, iiko_client, print_envelope};

/// Send a stored order to iiko.
pub async fn order(id: i64) -> Result<(), CommandError> {
    let store = connect().await?;
    let (iiko, config) = iiko_client()?;
    let defaults = ExportDefaults {
        organization_id: config.organization_id,
        terminal_group_id: config.terminal_group_id,
        delivery: DeliveryDefaults::from_env(),
    };

    let exporter = Exporter::new(&iiko, &store, &store, &store, &defaults, &DefaultHooks);
    let mut logs = Logs::new();
    match exporter
        .export_order_manually(OrderId::new(id), &mut logs)
        .await
    {
        Ok(response) => print_envelope(&Envelope::new(response, logs)),
        Err(e) => {
            print_envelope(&Envelope::<()>::failed(logs))?;
            Err(e.into())
        }
    }
}

/// Look up an exported order in iiko.
pub async fn check(id: i64) -> Result<(), CommandError> {
    let store = connect().await?;
    let (iiko, config) = iiko_client()?;
    let defaults = ExportDefaults {
        organization_id: config.organization_id,
        terminal_group_id: config.terminal_group_id,
        delivery: DeliveryDefaults::default(),
    };

    let exporter = Exporter::new(&iiko, &store, &store, &store, &defaults, &DefaultHooks);
    let response = exporter.check_created_delivery(OrderId::new(id)).await?;

    print_envelope(&Envelope::new(response, Logs::new()))
}
