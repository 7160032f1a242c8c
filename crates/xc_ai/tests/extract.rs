use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;
use xc_ai::extract::{
    build_context, build_extraction_prompt, extract_row, parse_llm_output, select_schema, RowOutcome,
};
use xc_ai::llm::{Llm, SamplingOptions};
use xc_core::domain::{CellValue, Row};
use xc_core::error::AppError;

struct StubLlm {
    reply: Result<String, AppError>,
    calls: AtomicUsize,
    prompts: RefCell<Vec<String>>,
    options: RefCell<Vec<SamplingOptions>>,
}

impl StubLlm {
    fn replying(reply: Result<String, AppError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: RefCell::new(Vec::new()),
            options: RefCell::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Llm for StubLlm {
    fn generate(&self, _model: &str, prompt: &str, options: &SamplingOptions) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.borrow_mut().push(prompt.to_string());
        self.options.borrow_mut().push(*options);
        self.reply.clone()
    }
}

fn battle_row() -> Row {
    Row::from_pairs([
        ("Unnamed: 0", CellValue::text("1")),
        (" 名称 ", CellValue::text(" 长平之战 ")),
        ("朝代", CellValue::text("战国")),
        ("年份", CellValue::Int(-260)),
        ("备注", CellValue::Null),
        ("描述", CellValue::text("   ")),
    ])
}

#[test]
fn context_keeps_trimmed_text_columns_only() {
    assert_eq!(
        build_context(&battle_row()).as_deref(),
        Some("名称: 长平之战\n朝代: 战国")
    );
}

#[test]
fn rows_without_text_skip_the_llm() {
    let llm = StubLlm::replying(Ok("{}".to_string()));
    let rows = [
        Row::new(),
        Row::from_pairs([("年份", CellValue::Int(1368)), ("人口", CellValue::Float(2.5))]),
        Row::from_pairs([("名称", CellValue::text("  ")), ("备注", CellValue::Null)]),
        Row::from_pairs([("Unnamed: 3", CellValue::text("孤立文本"))]),
    ];
    for row in rows.iter() {
        assert_eq!(build_context(row), None);
        assert_eq!(extract_row(&llm, "mock", row, "18战争"), RowOutcome::NoText);
    }
    assert_eq!(llm.call_count(), 0);
}

#[test]
fn fenced_json_is_parsed() {
    let llm = StubLlm::replying(Ok("```json\n{\"a\":1}\n```".to_string()));
    let out = extract_row(&llm, "mock", &battle_row(), "18战争-总数据");

    let RowOutcome::Parsed(map) = out else {
        panic!("expected parsed outcome, got {out:?}");
    };
    assert_eq!(serde_json::Value::Object(map), json!({"a": 1}));
    assert_eq!(llm.call_count(), 1);
    assert_eq!(llm.options.borrow()[0], SamplingOptions::deterministic());
}

#[test]
fn bare_json_with_whitespace_is_parsed() {
    let out = parse_llm_output("  {\"event_name\": null, \"dynasty\": \"战国\"}\n", "ctx");
    assert_eq!(
        out.to_llm_processed(),
        Some(json!({"event_name": null, "dynasty": "战国"}))
    );
}

#[test]
fn non_json_output_keeps_the_context_block() {
    let llm = StubLlm::replying(Ok("not json".to_string()));
    let out = extract_row(&llm, "mock", &battle_row(), "18战争-总数据");

    assert_eq!(
        out,
        RowOutcome::Malformed {
            original_text: "名称: 长平之战\n朝代: 战国".to_string()
        }
    );
    assert_eq!(
        out.to_llm_processed(),
        Some(json!({"original_text": "名称: 长平之战\n朝代: 战国", "error": "non-JSON output"}))
    );
}

#[test]
fn json_that_is_not_an_object_is_malformed() {
    for raw in ["[1, 2]", "\"text\"", "42", ""] {
        assert_eq!(
            parse_llm_output(raw, "ctx"),
            RowOutcome::Malformed {
                original_text: "ctx".to_string()
            },
            "{raw}"
        );
    }
}

#[test]
fn request_failure_is_distinct_from_no_text() {
    let err = AppError::new("LLM_REQUEST_FAILED", "connection refused").with_retryable(true);
    let llm = StubLlm::replying(Err(err.clone()));
    let out = extract_row(&llm, "mock", &battle_row(), "18战争-总数据");

    assert_eq!(out, RowOutcome::RequestFailed(err));
    assert_eq!(
        out.to_llm_processed(),
        Some(json!({"error": "request failed", "code": "LLM_REQUEST_FAILED"}))
    );
    assert_eq!(llm.call_count(), 1);
    assert_eq!(RowOutcome::NoText.to_llm_processed(), None);
}

#[test]
fn prompt_carries_rules_fields_and_context() {
    let llm = StubLlm::replying(Ok("{}".to_string()));
    extract_row(&llm, "mock", &battle_row(), "18战争-总数据");
    let prompt = llm.prompts.borrow()[0].clone();

    assert!(prompt.contains("优先使用 '时期' 或 '朝代' 字段"));
    assert!(prompt.contains("该字段的值必须为 `null`"));
    assert!(prompt.contains("绝对不允许"));
    assert!(prompt.contains("文件上下文: 18战争-总数据"));
    assert!(prompt.contains("- \"event_name\":"));
    assert!(prompt.contains("---\n名称: 长平之战\n朝代: 战国\n---"));
    assert!(prompt.trim_end().ends_with("JSON输出:"));

    let rebuilt = build_extraction_prompt(
        &select_schema("18战争-总数据"),
        "18战争-总数据",
        "名称: 长平之战\n朝代: 战国",
    );
    assert_eq!(prompt, rebuilt);
}
