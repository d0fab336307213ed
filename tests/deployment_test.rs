use std::time::Duration;

use edgelink::testing::{scripted_client, test_config};
use edgelink::types::ArmErrorKind;
use edgelink::{ArmResponse, EdgeLinkService};
use serde_json::json;

async fn connected(config: edgelink::ArmConfig) -> (
    EdgeLinkService,
    std::sync::Arc<edgelink::testing::ScriptedTransport>,
    std::sync::Arc<edgelink::ManualClock>,
) {
    let (client, transport, clock) = scripted_client(config);
    transport.push_json(
        200,
        json!({"name": "dev1", "properties": {"edgeProfile": {"subscription": {"subscriptionId": "lsub"}}}}),
    );
    let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();
    (service, transport, clock)
}

fn template() -> serde_json::Value {
    json!({
        "$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#",
        "contentVersion": "1.0.0.0",
        "resources": []
    })
}

#[tokio::test]
async fn subscription_deployment_uses_default_location() {
    let (service, transport, _) = connected(test_config()).await;
    transport
        .push_accepted("https://arm.test/op/rg")
        .push_status("Succeeded");

    let params = json!({"contentVersion": "1.0.0.0", "parameters": {"rgName": {"value": "edge-rg"}}});
    let name = service
        .deploy_to_subscription(&template(), Some(&params), None)
        .await
        .unwrap();

    assert!(name.starts_with("deployment"));
    let put = &transport.mutations()[0];
    assert!(put.url.ends_with(&format!(
        "/linkedSubscriptions/lsub/linkedProviders/Microsoft.Resources/deployments/{name}"
    )));
    let body = put.body.as_ref().unwrap();
    assert_eq!(body["location"], "dbelocal");
    assert_eq!(body["properties"]["mode"], "Incremental");
    assert_eq!(body["properties"]["parameters"]["rgName"]["value"], "edge-rg");
}

#[tokio::test]
async fn slow_status_endpoint_is_overridden_by_deployment_state() {
    let mut config = test_config();
    config.polling.deployment_timeout_mins = 2;
    let (service, transport, clock) = connected(config).await;

    transport.push_accepted("https://arm.test/op/slow");
    for _ in 0..8 {
        transport.push_status("Running");
    }
    transport.push_json(200, json!({"name": "vm-deploy", "properties": {"provisioningState": "Succeeded"}}));

    let name = service
        .deploy_to_resource_group("edge-rg", &template(), None, Some("vm-deploy"))
        .await
        .unwrap();

    assert_eq!(name, "vm-deploy");
    assert_eq!(clock.elapsed(), Duration::from_secs(120));
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn status_endpoint_outage_counts_as_timeout() {
    let mut config = test_config();
    config.polling.deployment_timeout_mins = 1;
    config.retry.max_attempts = 2;
    let (service, transport, _) = connected(config).await;

    transport
        .push_accepted("https://arm.test/op/down")
        .push(ArmResponse::new(503, ""))
        .push(ArmResponse::new(503, ""))
        .push_json(200, json!({"properties": {"provisioningState": "Failed"}}));

    let err = service
        .deploy_to_resource_group("edge-rg", &template(), None, Some("d1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ArmErrorKind::Timeout);
    assert!(err.message.contains("Failed"));
    assert_eq!(transport.remaining(), 0);
}
