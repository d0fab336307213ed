use std::time::Duration;

use edgelink::testing::{scripted_client, test_config};
use edgelink::types::{resource_types, ArmErrorKind};
use edgelink::{ArmResponse, EdgeLinkService, LinkedScope};
use serde_json::{json, Value};

fn device_doc() -> Value {
    json!({
        "id": "/subscriptions/sub-1/resourceGroups/saas-rg/providers/Microsoft.DataboxEdge/dataBoxEdgeDevices/dev1",
        "name": "dev1",
        "properties": {"edgeProfile": {"subscription": {"subscriptionId": "lsub"}}}
    })
}

fn local(kind: &str, rg: &str, name: &str) -> String {
    format!("/subscriptions/lsub/resourceGroups/{rg}/providers/{kind}/{name}")
}

fn linked(kind: &str, rg: &str, name: &str) -> String {
    LinkedScope::new("sub-1", "saas-rg", "lsub").resource_path(rg, kind, name)
}

fn vm_doc(nics: Value, data_disks: Value) -> Value {
    json!({
        "id": linked(resource_types::VIRTUAL_MACHINES, "vm-rg", "vm1"),
        "name": "vm1",
        "location": "dbelocal",
        "properties": {
            "hardwareProfile": {"vmSize": "Standard_D1_v2"},
            "storageProfile": {
                "osDisk": {"name": "vm1_os", "managedDisk": {"id": local(resource_types::DISKS, "vm-rg", "vm1_os")}},
                "dataDisks": data_disks
            },
            "networkProfile": {"networkInterfaces": nics}
        }
    })
}

#[tokio::test]
async fn connect_retries_device_lookup() {
    let (client, transport, clock) = scripted_client(test_config());
    transport
        .push(ArmResponse::new(503, "busy"))
        .push(ArmResponse::new(502, "busy"))
        .push_json(200, device_doc());

    let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();

    assert_eq!(service.scope().linked_subscription_id, "lsub");
    assert_eq!(transport.request_count(), 3);
    assert_eq!(clock.elapsed(), Duration::from_secs(30));
    let summary = service.connection_summary();
    assert!(summary.authenticated);
    assert_eq!(summary.linked_subscription_id, "lsub");
}

#[tokio::test]
async fn connect_gives_up_on_client_error() {
    let (client, transport, clock) = scripted_client(test_config());
    transport.push(ArmResponse::new(404, r#"{"error":{"code":"ResourceNotFound"}}"#));

    let err = EdgeLinkService::connect(client, "saas-rg", "missing")
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind, ArmErrorKind::RequestFailed);
    assert_eq!(err.error_code().as_deref(), Some("ResourceNotFound"));
    assert_eq!(err.status_code, Some(404));
    assert_eq!(transport.request_count(), 1);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn attach_and_probe_disk() {
    let (client, transport, _) = scripted_client(test_config());
    transport.push_json(200, device_doc());
    let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();

    let attached = json!([{
        "lun": 0,
        "name": "data1",
        "managedDisk": {"id": local(resource_types::DISKS, "disk-rg", "data1")}
    }]);
    transport
        .push_json(200, vm_doc(json!([]), json!([])))
        .push_json(
            200,
            json!({
                "id": linked(resource_types::DISKS, "disk-rg", "data1"),
                "name": "data1",
                "properties": {"diskSizeGB": 16}
            }),
        )
        .push(ArmResponse::new(202, "").with_header("Location", "https://arm.test/op/attach"))
        .push(ArmResponse::new(200, ""))
        .push_status("Succeeded")
        .push_json(200, vm_doc(json!([]), attached));

    service
        .attach_disk("vm-rg", "vm1", "disk-rg", "data1", 0)
        .await
        .unwrap();
    assert!(service
        .is_disk_attached("vm-rg", "vm1", "disk-rg", "data1")
        .await
        .unwrap());

    let mutations = transport.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(
        mutations[0].query_value("api-version"),
        Some("2020-06-01-preview")
    );
    assert_eq!(mutations[0].bearer_token, "test-token");
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn failed_attach_reports_operation_error() {
    let (client, transport, _) = scripted_client(test_config());
    transport.push_json(200, device_doc());
    let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();

    transport
        .push_json(200, vm_doc(json!([{"id": local(resource_types::NETWORK_INTERFACES, "vm-rg", "nic-a")}]), json!([])))
        .push_json(200, json!({"id": linked(resource_types::NETWORK_INTERFACES, "nic-rg", "nic-b"), "name": "nic-b"}))
        .push_accepted("https://arm.test/op/nic")
        .push_json(200, json!({"status": "Failed", "error": {"code": "VmRunning"}}));

    let err = service
        .attach_nic("vm-rg", "vm1", "nic-rg", "nic-b", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ArmErrorKind::OperationFailed);
}

#[tokio::test]
async fn delete_vm_removes_dependents_in_order() {
    let (client, transport, _) = scripted_client(test_config());
    transport.push_json(200, device_doc());
    let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();

    let vm = vm_doc(
        json!([{"id": local(resource_types::NETWORK_INTERFACES, "vm-rg", "nic-a")}]),
        json!([{"lun": 0, "name": "data1", "managedDisk": {"id": local(resource_types::DISKS, "disk-rg", "data1")}}]),
    );
    transport.push_json(200, vm.clone()).push_json(200, vm);
    for op in ["vm", "data1", "os", "nic"] {
        transport
            .push_accepted(&format!("https://arm.test/op/{op}"))
            .push_status("Succeeded");
    }

    service.delete_vm_and_dependents("vm-rg", "vm1").await.unwrap();

    let deleted: Vec<String> = transport
        .mutations()
        .into_iter()
        .map(|r| r.url.rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(deleted, vec!["vm1", "data1", "vm1_os", "nic-a"]);
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn service_state_is_shared_across_tasks() {
    let (client, transport, _) = scripted_client(test_config());
    transport.push_json(200, device_doc());
    let state = EdgeLinkService::connect(client, "saas-rg", "dev1")
        .await
        .unwrap()
        .into_state();

    transport.push_json(
        200,
        json!({"id": linked(resource_types::DISKS, "disk-rg", "data1"), "name": "data1", "properties": {"diskSizeGB": 64}}),
    );
    let handle = {
        let state = state.clone();
        tokio::spawn(async move {
            let service = state.lock().await;
            service.is_disk_size("disk-rg", "data1", 64).await
        })
    };
    assert!(handle.await.unwrap().unwrap());
}
