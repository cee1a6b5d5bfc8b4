//! End-to-end behavior of the ask pipeline with stubbed oracle and executor

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use sqlask_core::{
    AskPipeline, CompletionOracle, ExecutorError, GenerationSettings, InputError, MutatingKeyword,
    NormalizedQuery, OracleError, PipelineError, QueryExecutor, ResultSet, Row, Schema,
    TranslationRequest, CLARIFICATION_MESSAGE, EMPTY_RESULT_HTML,
};

/// Answers per utterance; unknown utterances fail like a dropped connection.
struct ScriptedOracle {
    answers: HashMap<String, String>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(u, a)| (u.to_string(), a.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionOracle for ScriptedOracle {
    async fn complete(&self, request: &TranslationRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(request.utterance())
            .cloned()
            .ok_or_else(|| OracleError::Transport("connection reset".to_string()))
    }
}

struct StubExecutor {
    rows: ResultSet,
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl QueryExecutor for StubExecutor {
    async fn execute(&self, query: &NormalizedQuery) -> Result<ResultSet, ExecutorError> {
        self.executed.lock().unwrap().push(query.to_string());
        if query.as_str().contains("missing_column") {
            return Err(ExecutorError::Database("no such column: missing_column".to_string()));
        }
        Ok(self.rows.clone())
    }
}

fn customers() -> ResultSet {
    vec![
        [("id", json!(1)), ("name", json!("Hans Johannesen")), ("city", json!("Berlin"))]
            .into_iter()
            .collect::<Row>(),
        [("id", json!(2)), ("name", json!("Anna Müller"))]
            .into_iter()
            .collect::<Row>(),
    ]
}

fn setup(answers: &[(&str, &str)], rows: ResultSet) -> (AskPipeline, Arc<ScriptedOracle>, Arc<StubExecutor>) {
    let oracle = Arc::new(ScriptedOracle::new(answers));
    let executor = Arc::new(StubExecutor {
        rows,
        executed: Mutex::new(Vec::new()),
    });
    let pipeline = AskPipeline::new(
        oracle.clone(),
        executor.clone(),
        Schema::sales(),
        GenerationSettings::default(),
    );
    (pipeline, oracle, executor)
}

#[tokio::test]
async fn explicit_all_request_executes_generic_query() {
    let (pipeline, _, executor) = setup(&[("Zeig mir alle Kunden", "select * from customers")], customers());

    let response = pipeline.ask("Zeig mir alle Kunden").await.unwrap();

    assert_eq!(response.query.as_str(), "select * from customers");
    assert_eq!(response.row_count, 2);
    assert!(response.results_html.contains("<th>id</th><th>name</th><th>city</th>"));
    assert!(response.results_html.contains("<tr><td>2</td><td>Anna Müller</td><td>—</td></tr>"));
    assert_eq!(executor.executed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unclear_request_with_generic_query_is_not_executed() {
    let (pipeline, _, executor) = setup(&[("Wer ist das?", "select * from customers")], customers());

    let err = pipeline.ask("Wer ist das?").await.unwrap_err();

    match err {
        PipelineError::AmbiguousIntent { template, message, .. } => {
            assert_eq!(template, "select * from customers");
            assert_eq!(message, CLARIFICATION_MESSAGE);
        }
        other => panic!("expected ambiguous intent, got {other:?}"),
    }
    assert!(executor.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn injected_drop_is_rejected_and_never_executed() {
    let (pipeline, _, executor) = setup(
        &[("Zeig mir alle Verkäufe", "SELECT * FROM sales WHERE 1=1; DROP TABLE sales")],
        Vec::new(),
    );

    let err = pipeline.ask("Zeig mir alle Verkäufe").await.unwrap_err();

    assert_eq!(err.kind(), "unsafe_query");
    assert!(matches!(
        err,
        PipelineError::UnsafeQuery { keyword: Some(MutatingKeyword::Drop), .. }
    ));
    assert!(executor.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_select_is_rejected() {
    let (pipeline, _, executor) = setup(&[("Lösche alle Verkäufe", "DELETE FROM sales")], Vec::new());

    let err = pipeline.ask("Lösche alle Verkäufe").await.unwrap_err();

    assert!(matches!(err, PipelineError::UnsafeQuery { keyword: None, .. }));
    assert!(executor.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn identifier_with_denied_substring_executes() {
    let (pipeline, _, executor) = setup(&[("show the update log", "SELECT * FROM updates_log")], Vec::new());

    let response = pipeline.ask("show the update log").await.unwrap();

    assert_eq!(response.results_html, EMPTY_RESULT_HTML);
    assert_eq!(executor.executed.lock().unwrap().as_slice(), &["SELECT * FROM updates_log".to_string()]);
}

#[tokio::test]
async fn first_cue_limits_result_to_one_row() {
    let (pipeline, _, executor) = setup(
        &[("Who was hired first?", "SELECT * FROM employees ORDER BY hire_date ASC")],
        Vec::new(),
    );

    let response = pipeline.ask("Who was hired first?").await.unwrap();

    assert_eq!(response.query.as_str(), "SELECT * FROM employees ORDER BY hire_date ASC LIMIT 1");
    assert_eq!(executor.executed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_utterance_never_reaches_oracle() {
    let (pipeline, oracle, _) = setup(&[], Vec::new());

    let err = pipeline.ask("   ").await.unwrap_err();

    assert!(matches!(err, PipelineError::Input(InputError::EmptyUtterance)));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oracle_failure_surfaces_without_retry() {
    let (pipeline, oracle, executor) = setup(&[], Vec::new());

    let err = pipeline.ask("Welche Kunden sind in Berlin?").await.unwrap_err();

    assert_eq!(err.kind(), "oracle_error");
    assert!(matches!(err, PipelineError::Oracle(OracleError::Transport(_))));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    assert!(executor.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn execution_error_keeps_store_message() {
    let (pipeline, _, _) = setup(
        &[("Welche Kunden sind in Berlin?", "SELECT missing_column FROM customers WHERE city = 'Berlin'")],
        Vec::new(),
    );

    let err = pipeline.ask("Welche Kunden sind in Berlin?").await.unwrap_err();

    assert_eq!(err.kind(), "execution_error");
    assert_eq!(err.to_string(), "SQL execution error: no such column: missing_column");
}
