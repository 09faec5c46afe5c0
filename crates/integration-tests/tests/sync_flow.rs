//! End-to-end orchestrator flows: list, fetch, create, update, teardown.

use std::sync::atomic::Ordering;

use celekt_core::{CurrencyCode, IssueStatus, LeadStatus, Money};
use celekt_crm::query::Filter;
use celekt_crm::types::{ApprovedSale, ApprovedSalePatch, Issue, Lead, LeadInput, LeadPatch};
use celekt_crm::{CrmEntity, ErrorKind, RemoteClient, SyncOrchestrator, SyncStatus};
use celekt_integration_tests::MockCrm;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn list_maps_records_and_defaults_missing_fields() {
    let mock = MockCrm::start().await;
    mock.seed_records(vec![
        json!({
            "Id": "00Q5g00000AbCdEFGH",
            "FirstName": "Rajesh",
            "LastName": "Kumar",
            "Email": "rajesh.kumar@example.com",
            "Phone": "+91 98765 43210",
            "City": "Mumbai",
            "Product_Interest__c": "iPhone 15 Pro",
            "Status": "New",
            "CreatedDate": "2024-01-15T09:30:00.000+0000"
        }),
        // Sparse record: every missing field must land on its default.
        json!({"Id": "00Q5g00000SparseXX"}),
    ])
    .await;

    let mut sync = SyncOrchestrator::<Lead>::new(RemoteClient::new(&mock.config()));
    let state = sync.list(Filter::new().eq("Status", "New")).await;

    assert_eq!(state.status, SyncStatus::Ready);
    let leads = state.data.as_ref().unwrap();
    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].full_name(), "Rajesh Kumar");
    assert_eq!(leads[1].phone, "N/A");
    assert_eq!(leads[1].status, LeadStatus::New);

    // The filter reached the CRM as a typed conjunction, not ad-hoc text.
    let soql = mock.state.last_query.lock().await.clone().unwrap();
    assert!(soql.ends_with("FROM Lead WHERE Status = 'New'"));
}

#[tokio::test]
async fn get_by_id_reports_missing_records_as_remote_failure() {
    let mock = MockCrm::start().await;

    let mut sync = SyncOrchestrator::<Issue>::new(RemoteClient::new(&mock.config()));
    let state = sync.get_by_id("5005g00000Missing").await;

    assert_eq!(state.status, SyncStatus::Error);
    let error = state.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::Remote);
    assert!(error.message.contains("no Case record"));
}

#[tokio::test]
async fn create_with_missing_required_fields_never_reaches_the_wire() {
    let mock = MockCrm::start().await;

    let mut sync = SyncOrchestrator::<Lead>::new(RemoteClient::new(&mock.config()));
    let input = LeadInput {
        first_name: "Priya".to_string(),
        // last name and phone missing
        ..LeadInput::default()
    };
    let state = sync.create(&input).await;

    assert_eq!(state.status, SyncStatus::Error);
    assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Validation);
    assert_eq!(
        mock.state.command_requests.load(Ordering::SeqCst),
        0,
        "local validation must reject before any request is sent"
    );
    // A validation reject does not even need a credential.
    assert_eq!(mock.state.token_exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_maps_the_record_echo() {
    let mock = MockCrm::start().await;
    *mock.state.command_echo.lock().await = Some(json!({
        "Id": "00Q5g00000CreatedX",
        "FirstName": "Priya",
        "LastName": "Sharma",
        "Phone": "+91 87654 32109",
        "Status": "New"
    }));

    let mut sync = SyncOrchestrator::<Lead>::new(RemoteClient::new(&mock.config()));
    let input = LeadInput {
        first_name: "Priya".to_string(),
        last_name: "Sharma".to_string(),
        phone: "+91 87654 32109".to_string(),
        ..LeadInput::default()
    };
    let state = sync.create(&input).await;

    assert_eq!(state.status, SyncStatus::Ready);
    assert_eq!(
        state.data.as_ref().unwrap().id.as_str(),
        "00Q5g00000CreatedX"
    );

    let (command, payload) = mock.state.last_command.lock().await.clone().unwrap();
    assert_eq!(command, "createLead");
    assert_eq!(payload["LastName"], "Sharma");
}

#[tokio::test]
async fn update_merges_into_the_held_list_only_after_success() {
    let mock = MockCrm::start().await;
    mock.seed_records(vec![
        json!({"Id": "00Q5g00000AbCdEFGH", "FirstName": "Rajesh", "LastName": "Kumar", "Status": "New"}),
        json!({"Id": "00Q5g00000OtherXYZ", "FirstName": "Amit", "LastName": "Patel", "Status": "New"}),
    ])
    .await;

    let mut sync = SyncOrchestrator::<Lead>::new(RemoteClient::new(&mock.config()));
    sync.list(Filter::new()).await;
    let before = sync.list_state().data.clone().unwrap();

    let patch = LeadPatch {
        status: Some(LeadStatus::Converted),
        ..LeadPatch::default()
    };
    let state = sync.update("00Q5g00000AbCdEFGH", patch.clone()).await;
    assert_eq!(state.status, SyncStatus::Ready);

    // Round-trip: the held entity equals the pre-update entity merged with
    // the patch, and only the targeted record changed.
    let mut expected = before.clone();
    expected[0].apply_patch(&patch);
    let after = sync.list_state().data.clone().unwrap();
    assert_eq!(after, expected);
    assert_eq!(after[0].status, LeadStatus::Converted);
    assert_eq!(after[1].status, LeadStatus::New);

    // Idempotent: confirming the same patch again changes nothing.
    sync.update("00Q5g00000AbCdEFGH", patch).await;
    assert_eq!(sync.list_state().data.clone().unwrap(), after);
}

#[tokio::test]
async fn failed_update_leaves_the_list_snapshot_untouched() {
    let mock = MockCrm::start().await;
    mock.seed_records(vec![json!({
        "Id": "0065g00000SaleABCD",
        "Name": "Rajesh Kumar",
        "Amount": 100000,
        "Expected_Discount__c": 10
    })])
    .await;

    let mut sync = SyncOrchestrator::<ApprovedSale>::new(RemoteClient::new(&mock.config()));
    sync.list(Filter::new()).await;
    let before = sync.list_state().data.clone().unwrap();
    assert_eq!(before[0].final_price.amount, Decimal::from(90_000));

    *mock.state.scripted_failure.lock().await =
        Some((400, json!([{"message": "bill number in use"}]).to_string()));

    let patch = ApprovedSalePatch {
        bill_number: Some("CLK-2024-0042".to_string()),
        billing_amount: Some(Money::new(Decimal::from(90_000), CurrencyCode::INR)),
    };
    let state = sync.update("0065g00000SaleABCD", patch).await;

    assert_eq!(state.status, SyncStatus::Error);
    // No pre-confirmation optimism: the snapshot still shows no bill.
    let after = sync.list_state().data.clone().unwrap();
    assert_eq!(after, before);
    assert_eq!(after[0].bill_number, "");
}

#[tokio::test]
async fn dropping_an_in_flight_list_discards_the_result() {
    let mock = MockCrm::start().await;
    mock.seed_records(vec![json!({"Id": "5005g0", "Subject": "AC"})])
        .await;
    mock.state.query_delay_ms.store(200, Ordering::SeqCst);

    let mut sync = SyncOrchestrator::<Issue>::new(RemoteClient::new(&mock.config()));

    {
        let in_flight = sync.list(Filter::new());
        tokio::pin!(in_flight);
        // Give the operation a chance to start, then abandon it mid-flight.
        let raced = tokio::time::timeout(std::time::Duration::from_millis(50), &mut in_flight);
        assert!(raced.await.is_err(), "the list call should still be in flight");
    }

    // The screen is gone. Even after the server response would have
    // arrived, no state was mutated by the abandoned operation.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert_eq!(sync.list_state().status, SyncStatus::Loading);
    assert!(sync.list_state().data.is_none());
    assert!(sync.list_state().error.is_none());

    // A fresh session starts clean and works.
    sync.reset();
    assert_eq!(sync.list_state().status, SyncStatus::Idle);
    mock.state.query_delay_ms.store(0, Ordering::SeqCst);
    let state = sync.list(Filter::new()).await;
    assert_eq!(state.status, SyncStatus::Ready);
    assert_eq!(state.data.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn sale_create_is_rejected_locally() {
    let mock = MockCrm::start().await;

    let mut sync = SyncOrchestrator::<ApprovedSale>::new(RemoteClient::new(&mock.config()));
    let state = sync
        .create(&celekt_crm::types::ApprovedSaleInput::default())
        .await;

    assert_eq!(state.status, SyncStatus::Error);
    assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Validation);
    assert_eq!(mock.state.command_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn issue_update_closes_and_merges() {
    let mock = MockCrm::start().await;
    mock.seed_records(vec![json!({
        "Id": "5005g00000XyZaBCDE",
        "Subject": "CCTV camera issue",
        "Status": "Open",
        "Priority": "Low",
        "Category__c": "Security Systems"
    })])
    .await;

    let mut sync = SyncOrchestrator::<Issue>::new(RemoteClient::new(&mock.config()));
    sync.list(Filter::new()).await;

    let patch = celekt_crm::types::IssuePatch {
        status: Some(IssueStatus::Closed),
        ..Default::default()
    };
    let state = sync.update("5005g00000XyZaBCDE", patch).await;

    assert_eq!(state.status, SyncStatus::Ready);
    let list = sync.list_state().data.as_ref().unwrap();
    assert_eq!(list[0].status, IssueStatus::Closed);
}
