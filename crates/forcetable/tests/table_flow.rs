//! End-to-end verb tests against an in-process executor.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use forcetable::{ErrorKind, Operator, Table};
use forcetable_client::{
    Error, ErrorKind as ClientErrorKind, RawPage, RemoteExecutor, Result as ClientResult,
    SaveResult,
};

/// Scripted executor: operations pop pre-queued results and record
/// what was asked of them.
#[derive(Clone, Debug, Default)]
struct MockExecutor {
    state: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    pages: Mutex<VecDeque<ClientResult<RawPage>>>,
    saves: Mutex<VecDeque<ClientResult<SaveResult>>>,
    units: Mutex<VecDeque<ClientResult<()>>>,
    queries: Mutex<Vec<String>>,
    next_urls: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, Value)>>,
    deletes: Mutex<Vec<(String, String)>>,
}

impl MockExecutor {
    fn new() -> Self {
        Self::default()
    }

    fn queue_page(&self, raw: RawPage) -> &Self {
        self.state.pages.lock().unwrap().push_back(Ok(raw));
        self
    }

    fn queue_page_error(&self, err: Error) -> &Self {
        self.state.pages.lock().unwrap().push_back(Err(err));
        self
    }

    fn queue_save(&self, result: SaveResult) -> &Self {
        self.state.saves.lock().unwrap().push_back(Ok(result));
        self
    }

    fn queue_unit(&self) -> &Self {
        self.state.units.lock().unwrap().push_back(Ok(()));
        self
    }

    fn queue_unit_error(&self, err: Error) -> &Self {
        self.state.units.lock().unwrap().push_back(Err(err));
        self
    }

    fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    fn next_urls(&self) -> Vec<String> {
        self.state.next_urls.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<(String, Value)> {
        self.state.writes.lock().unwrap().clone()
    }

    fn deletes(&self) -> Vec<(String, String)> {
        self.state.deletes.lock().unwrap().clone()
    }
}

impl RemoteExecutor for MockExecutor {
    async fn ensure_authenticated(&self) -> ClientResult<()> {
        Ok(())
    }

    async fn run_query(&self, soql: &str) -> ClientResult<RawPage> {
        self.state.queries.lock().unwrap().push(soql.to_string());
        self.state
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("no page queued for run_query")
    }

    async fn fetch_next_page(&self, next_records_url: &str) -> ClientResult<RawPage> {
        self.state
            .next_urls
            .lock()
            .unwrap()
            .push(next_records_url.to_string());
        self.state
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("no page queued for fetch_next_page")
    }

    async fn create_record(&self, table: &str, data: &Value) -> ClientResult<SaveResult> {
        self.state
            .writes
            .lock()
            .unwrap()
            .push((table.to_string(), data.clone()));
        self.state
            .saves
            .lock()
            .unwrap()
            .pop_front()
            .expect("no save result queued for create_record")
    }

    async fn update_record(&self, table: &str, _id: &str, data: &Value) -> ClientResult<()> {
        self.state
            .writes
            .lock()
            .unwrap()
            .push((table.to_string(), data.clone()));
        self.state
            .units
            .lock()
            .unwrap()
            .pop_front()
            .expect("no result queued for update_record")
    }

    async fn upsert_record(
        &self,
        table: &str,
        _external_id_field: &str,
        _id: &str,
        data: &Value,
    ) -> ClientResult<SaveResult> {
        self.state
            .writes
            .lock()
            .unwrap()
            .push((table.to_string(), data.clone()));
        self.state
            .saves
            .lock()
            .unwrap()
            .pop_front()
            .expect("no save result queued for upsert_record")
    }

    async fn delete_record(&self, table: &str, id: &str) -> ClientResult<()> {
        self.state
            .deletes
            .lock()
            .unwrap()
            .push((table.to_string(), id.to_string()));
        self.state
            .units
            .lock()
            .unwrap()
            .pop_front()
            .expect("no result queued for delete_record")
    }
}

fn page_of(total_size: u64, records: Vec<Value>, next: Option<&str>) -> RawPage {
    RawPage {
        total_size,
        done: next.is_none(),
        next_records_url: next.map(str::to_string),
        records,
    }
}

fn service_error(code: &str, message: &str) -> Error {
    let body = json!([{"errorCode": code, "message": message}]).to_string();
    Error::new(ClientErrorKind::Api { status: 400, body })
}

#[tokio::test]
async fn test_execute_renders_full_query() {
    let executor = MockExecutor::new();
    executor.queue_page(page_of(1, vec![json!({"Id": "001"})], None));

    let page = Table::new("Account", executor.clone())
        .select(["Id", "Name"])
        .filter("Industry", "Technology")
        .filter_op("NumberOfEmployees", Operator::Gt, 50)
        .order_by_desc("Name")
        .nulls_last()
        .limit(10)
        .execute()
        .await
        .unwrap();

    assert_eq!(
        executor.queries(),
        vec![
            "SELECT Id, Name FROM Account \
             WHERE Industry = 'Technology' AND NumberOfEmployees > 50 \
             ORDER BY Name DESC NULLS LAST LIMIT 10"
        ]
    );
    assert_eq!(page.page_number(), 1);
    assert_eq!(page.total_size(), 1);
    assert!(page.done());
}

#[tokio::test]
async fn test_find_returns_first_matching_record() {
    let executor = MockExecutor::new();
    executor.queue_page(page_of(1, vec![json!({"Id": "001", "Name": "Acme"})], None));

    let record = Table::new("Account", executor.clone())
        .find("001")
        .await
        .unwrap();

    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Account WHERE Id = '001'"]
    );
    assert_eq!(record["Name"], "Acme");
}

#[tokio::test]
async fn test_find_empty_result_is_not_found() {
    let executor = MockExecutor::new();
    executor.queue_page(page_of(0, vec![], None));

    let err = Table::new("Account", executor).find("001").await.unwrap_err();

    match err.kind {
        ErrorKind::NotFound(message) => {
            assert_eq!(message, "A record with the ID '001' could not be found");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_find_many_filters_with_in_clause() {
    let executor = MockExecutor::new();
    executor.queue_page(page_of(
        2,
        vec![json!({"Id": "001"}), json!({"Id": "002"})],
        None,
    ));

    let page = Table::new("Account", executor.clone())
        .find_many(["001", "002"])
        .await
        .unwrap();

    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Account WHERE Id IN ('001', '002')"]
    );
    assert_eq!(page.records().len(), 2);
}

#[tokio::test]
async fn test_find_many_empty_result_is_not_found() {
    let executor = MockExecutor::new();
    executor.queue_page(page_of(0, vec![], None));

    let err = Table::new("Account", executor)
        .find_many(["001", "002"])
        .await
        .unwrap_err();

    match err.kind {
        ErrorKind::NotFound(message) => {
            assert_eq!(message, "No records with the specified IDs could be found");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pages_follow_lazily_until_done() {
    let executor = MockExecutor::new();
    executor
        .queue_page(page_of(5, vec![json!({"n": 1}), json!({"n": 2})], Some("/q/abc-2")))
        .queue_page(page_of(5, vec![json!({"n": 3}), json!({"n": 4})], Some("/q/abc-4")))
        .queue_page(page_of(5, vec![json!({"n": 5})], None));

    let first = Table::new("Item__c", executor.clone())
        .execute()
        .await
        .unwrap();
    assert_eq!(first.page_number(), 1);
    assert_eq!(first.total_pages(), 3);
    assert!(!first.done());
    // Nothing beyond the first page has been fetched yet.
    assert!(executor.next_urls().is_empty());

    let second = first.next_page().await.unwrap().unwrap();
    assert_eq!(second.page_number(), 2);
    assert_eq!(second.query(), first.query());

    let third = second.next_page().await.unwrap().unwrap();
    assert_eq!(third.page_number(), 3);
    assert!(third.done());
    // Short final page inflates the per-page estimate.
    assert_eq!(third.total_pages(), 5);

    assert!(third.next_page().await.unwrap().is_none());
    assert_eq!(executor.next_urls(), vec!["/q/abc-2", "/q/abc-4"]);
}

#[tokio::test]
async fn test_create_rereads_by_new_id() {
    let executor = MockExecutor::new();
    executor.queue_save(SaveResult {
        id: Some("003".to_string()),
        success: true,
        created: Some(true),
        errors: vec![],
    });
    executor.queue_page(page_of(1, vec![json!({"Id": "003", "Name": "New"})], None));

    let saved = Table::new("Account", executor.clone())
        .create(&json!({"Name": "New"}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(saved.id, "003");
    assert_eq!(saved.record["Name"], "New");
    assert_eq!(
        executor.writes(),
        vec![("Account".to_string(), json!({"Name": "New"}))]
    );
    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Account WHERE Id = '003'"]
    );
}

#[tokio::test]
async fn test_create_unsuccessful_yields_none() {
    let executor = MockExecutor::new();
    executor.queue_save(SaveResult {
        id: None,
        success: false,
        created: None,
        errors: vec![],
    });

    let saved = Table::new("Account", executor.clone())
        .create(&json!({"Name": "New"}))
        .await
        .unwrap();

    assert!(saved.is_none());
    assert!(executor.queries().is_empty(), "no re-read on failure");
}

#[tokio::test]
async fn test_update_rereads_record() {
    let executor = MockExecutor::new();
    executor.queue_unit();
    executor.queue_page(page_of(1, vec![json!({"Id": "001", "Name": "Renamed"})], None));

    let record = Table::new("Account", executor.clone())
        .update("001", &json!({"Name": "Renamed"}))
        .await
        .unwrap();

    assert_eq!(record["Name"], "Renamed");
    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Account WHERE Id = '001'"]
    );
}

#[tokio::test]
async fn test_upsert_create_rereads_by_record_id() {
    let executor = MockExecutor::new();
    executor.queue_save(SaveResult {
        id: Some("005".to_string()),
        success: true,
        created: Some(true),
        errors: vec![],
    });
    executor.queue_page(page_of(1, vec![json!({"Id": "005"})], None));

    let saved = Table::new("Product__c", executor.clone())
        .upsert("Sku__c", "SKU-9", &json!({"Price__c": 10}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(saved.id, "005");
    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Product__c WHERE Id = '005'"]
    );
}

#[tokio::test]
async fn test_upsert_update_rereads_by_external_id() {
    let executor = MockExecutor::new();
    executor.queue_save(SaveResult {
        id: Some("SKU-9".to_string()),
        success: true,
        created: Some(false),
        errors: vec![],
    });
    executor.queue_page(page_of(1, vec![json!({"Id": "005", "Sku__c": "SKU-9"})], None));

    let saved = Table::new("Product__c", executor.clone())
        .upsert("Sku__c", "SKU-9", &json!({"Price__c": 12}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(saved.record["Id"], "005");
    assert_eq!(
        executor.queries(),
        vec!["SELECT FIELDS(ALL) FROM Product__c WHERE Sku__c = 'SKU-9'"]
    );
}

#[tokio::test]
async fn test_delete_returns_true() {
    let executor = MockExecutor::new();
    executor.queue_unit();

    let deleted = Table::new("Account", executor.clone())
        .delete("001")
        .await
        .unwrap();

    assert!(deleted);
    assert_eq!(
        executor.deletes(),
        vec![("Account".to_string(), "001".to_string())]
    );
}

#[tokio::test]
async fn test_query_error_is_translated() {
    let executor = MockExecutor::new();
    executor.queue_page_error(service_error(
        "MALFORMED_QUERY",
        "unexpected token: FORM\\nERROR at Row:1:Column:11",
    ));

    let err = Table::new("Account", executor).execute().await.unwrap_err();

    match err.kind {
        ErrorKind::MalformedQuery(message) => {
            assert_eq!(message, "unexpected token: FORM - ERROR at Row:1:Column:11");
        }
        other => panic!("expected MalformedQuery, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_error_is_translated() {
    let executor = MockExecutor::new();
    executor.queue_unit_error(service_error("ENTITY_IS_DELETED", "entity is deleted"));

    let err = Table::new("Account", executor)
        .delete("001")
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::EntityDeleted(_)));
}

#[tokio::test]
async fn test_unmapped_error_passes_through() {
    let executor = MockExecutor::new();
    executor.queue_page_error(service_error(
        "FIELD_CUSTOM_VALIDATION_EXCEPTION",
        "Quantity must be positive",
    ));

    let err = Table::new("Account", executor).execute().await.unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Remote(_)));
    assert!(err.to_string().contains("Quantity must be positive"));
}
