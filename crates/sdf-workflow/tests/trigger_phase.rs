mod common;

use serde_json::json;

use common::{FakeProcessor, Harness, MemoryStore};
use sdf_core::ErrorKind;
use sdf_workflow::{ExecutionStatus, PipelineTask, TriggerPipelineTask};

fn tasks(value: serde_json::Value) -> Vec<PipelineTask> {
    serde_json::from_value(value).unwrap()
}

fn trigger_input(value: serde_json::Value) -> TriggerPipelineTask {
    TriggerPipelineTask {
        callback_url: "https://callback.local/signal".into(),
        tasks: tasks(value),
    }
}

fn usepa_store() -> MemoryStore {
    let store = MemoryStore::default();
    store.definition("sif/usepa/ghg/electricity.pipeline.json", "usepa-electricity");
    store.put("data/usepa/ghg/electricity/data.csv", "year,value\n2022,1\n");
    store.definition("sif/usepa/ghg/fuels.pipeline.json", "usepa-fuels");
    store.put("data/usepa/ghg/fuels/data.csv", "year,value\n2022,2\n");
    store.put("sif/usepa/README.md", "not a definition");
    store
}

#[tokio::test]
async fn pops_lowest_priority_value_and_keeps_the_rest() {
    let store = MemoryStore::default();
    for n in 1..=3 {
        store.definition(&format!("sif/{n}.pipeline.json"), &format!("p{n}"));
        store.put(&format!("data/{n}.csv"), "a,b\n");
    }
    let h = Harness::new(store, FakeProcessor::with_pipelines(&["p1", "p2", "p3"]));

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "sifResourceKey": "sif/1.pipeline.json", "resourceKey": "data/1.csv"},
            {"priority": 3, "sifResourceKey": "sif/3.pipeline.json", "resourceKey": "data/3.csv"},
            {"priority": 2, "sifResourceKey": "sif/2.pipeline.json", "resourceKey": "data/2.csv"}
        ])))
        .await
        .unwrap();

    assert_eq!(h.processor.created()[0].0, "pipe-p1");
    assert_eq!(checked.executions_count, 1);
    let remaining: Vec<i64> = checked.tasks.iter().map(PipelineTask::priority).collect();
    assert_eq!(remaining, vec![3, 2]);
    assert_eq!(checked.callback_url, "https://callback.local/signal");
}

#[tokio::test]
async fn multi_task_creates_one_execution_per_definition() {
    let h = Harness::new(
        usepa_store(),
        FakeProcessor::with_pipelines(&["usepa-electricity", "usepa-fuels"]),
    );

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "resourcesPrefix": "data/usepa/", "sifResourcesPrefix": "sif/usepa/"}
        ])))
        .await
        .unwrap();

    assert_eq!(checked.executions_count, 2);
    assert!(checked.tasks.is_empty());
    let uploads = h.transfer.uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].0, "https://upload.local/exec-1");
    assert_eq!(uploads[0].1, "year,value\n2022,1\n");
    let (_, request) = &h.processor.created()[0];
    assert_eq!(request.mode, "job");
    assert_eq!(request.expiration, 600);
    assert!(request.connector_overrides.is_none());
}

#[tokio::test]
async fn missing_input_file_is_skipped() {
    let store = usepa_store();
    store.objects.lock().unwrap().remove("data/usepa/ghg/fuels/data.csv");
    let h = Harness::new(
        store,
        FakeProcessor::with_pipelines(&["usepa-electricity", "usepa-fuels"]),
    );

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "resourcesPrefix": "data/usepa/", "sifResourcesPrefix": "sif/usepa/"}
        ])))
        .await
        .unwrap();

    assert_eq!(checked.executions_count, 1);
    assert_eq!(checked.executions[0].pipeline_id, "pipe-usepa-electricity");
}

#[tokio::test]
async fn unknown_pipeline_is_skipped() {
    let h = Harness::new(usepa_store(), FakeProcessor::with_pipelines(&["usepa-fuels"]));

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "resourcesPrefix": "data/usepa/", "sifResourcesPrefix": "sif/usepa/"}
        ])))
        .await
        .unwrap();

    assert_eq!(checked.executions_count, 1);
    assert_eq!(checked.executions[0].pipeline_id, "pipe-usepa-fuels");
}

#[tokio::test]
async fn other_read_failures_abort_the_phase() {
    let store = usepa_store();
    store.fail_reads_of("data/usepa/ghg/fuels/data.csv");
    let h = Harness::new(
        store,
        FakeProcessor::with_pipelines(&["usepa-electricity", "usepa-fuels"]),
    );

    let err = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "resourcesPrefix": "data/usepa/", "sifResourcesPrefix": "sif/usepa/"}
        ])))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteFailure);
}

#[tokio::test]
async fn missing_upload_url_fails() {
    let h = Harness::new(usepa_store(), FakeProcessor::with_pipelines(&["usepa-electricity"]));
    *h.processor.omit_upload_url.lock().unwrap() = true;

    let err = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "sifResourceKey": "sif/usepa/ghg/electricity.pipeline.json",
             "resourceKey": "data/usepa/ghg/electricity/data.csv"}
        ])))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn data_fabric_task_injects_connector_overrides() {
    let store = MemoryStore::default();
    store.definition("sif/materials.pipeline.json", "golden-materials");
    let h = Harness::new(store, FakeProcessor::with_pipelines(&["golden-materials"]));

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "sifResourceKey": "sif/materials.pipeline.json",
             "resourceAssetName": "golden_materials"}
        ])))
        .await
        .unwrap();

    assert_eq!(checked.executions_count, 1);
    assert!(h.transfer.uploads().is_empty());
    let (_, request) = &h.processor.created()[0];
    let overrides = serde_json::to_value(request.connector_overrides.as_ref().unwrap()).unwrap();
    assert_eq!(
        overrides,
        json!({
            "sif-dataFabric-pipeline-input-connector": {
                "parameters": {
                    "domainId": "dzd_demo",
                    "environmentId": "env_demo",
                    "assetListingId": "listing-42"
                }
            }
        })
    );
    assert_eq!(
        h.catalog.searches.lock().unwrap()[0],
        ("dzd_demo".to_string(), "golden_materials".to_string())
    );
}

#[tokio::test]
async fn data_fabric_task_without_listing_fails() {
    let store = MemoryStore::default();
    store.definition("sif/unknown.pipeline.json", "unknown");
    let h = Harness::new(store, FakeProcessor::with_pipelines(&["unknown"]));

    let err = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "sifResourceKey": "sif/unknown.pipeline.json",
             "resourceAssetName": "no_such_asset"}
        ])))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(h.processor.created().is_empty());
}

#[tokio::test]
async fn check_reports_done_only_when_all_terminal() {
    let processor = FakeProcessor::with_pipelines(&["usepa-electricity", "usepa-fuels"]);
    processor.script(&[ExecutionStatus::InProgress, ExecutionStatus::Failed]);
    let h = Harness::new(usepa_store(), processor);

    let checked = h
        .trigger()
        .process(trigger_input(json!([
            {"priority": 1, "resourcesPrefix": "data/usepa/", "sifResourcesPrefix": "sif/usepa/"}
        ])))
        .await
        .unwrap();

    let first = h.check().process(checked.clone()).await.unwrap();
    assert!(!first.done);
    assert_eq!(first.task, checked);

    let second = h.check().process(checked).await.unwrap();
    assert!(second.done);
}

#[tokio::test]
async fn check_with_no_executions_is_done() {
    let h = Harness::new(MemoryStore::default(), FakeProcessor::default());
    let checked = h
        .trigger()
        .process(trigger_input(json!([])))
        .await
        .unwrap();

    assert!(h.check().process(checked).await.unwrap().done);
    assert_eq!(*h.processor.lookups.lock().unwrap(), 0);
}
