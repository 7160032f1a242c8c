use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use xc_ai::corpus::{CorpusCache, CorpusRecord, CORPUS_DATASETS};
use xc_ai::extract::RowOutcome;
use xc_ai::pipeline::merge_outcome;
use xc_core::dataset::{parse_csv_dataset, DatasetSource};
use xc_core::domain::{CellValue, Dataset, Row};
use xc_core::error::AppError;

struct CountingSource {
    datasets: HashMap<String, Dataset>,
    broken: Vec<String>,
    reads: Arc<AtomicUsize>,
    read_delay: Duration,
}

impl CountingSource {
    fn new(datasets: Vec<Dataset>) -> Self {
        Self {
            datasets: datasets.into_iter().map(|d| (d.name.clone(), d)).collect(),
            broken: Vec::new(),
            reads: Arc::new(AtomicUsize::new(0)),
            read_delay: Duration::ZERO,
        }
    }
}

impl DatasetSource for CountingSource {
    fn list_datasets(&self) -> Result<Vec<String>, AppError> {
        Ok(self.datasets.keys().cloned().collect())
    }

    fn read_dataset(&self, name: &str) -> Result<Option<Dataset>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        if self.broken.iter().any(|b| b == name) {
            return Err(AppError::new("DATASET_PARSE_FAILED", "broken fixture"));
        }
        Ok(self.datasets.get(name).cloned())
    }
}

fn people() -> Dataset {
    Dataset::new(
        "19人物",
        vec![
            Row::from_pairs([
                ("姓名", CellValue::text("汤王")),
                ("朝代", CellValue::text("商")),
                ("备注", CellValue::Null),
                ("年份", CellValue::Int(-1600)),
            ]),
            Row::from_pairs([("姓名", CellValue::text("  ")), ("朝代", CellValue::text("唐"))]),
        ],
    )
}

#[test]
fn record_text_skips_null_and_blank_values_in_column_order() {
    let ds = people();
    let rec = CorpusRecord::from_row("19人物", &ds.rows[0]);
    assert_eq!(rec.text, "[source:19人物] 姓名:汤王; 朝代:商; 年份:-1600");
    assert_eq!(rec.source, "19人物");

    let rec2 = CorpusRecord::from_row("19人物", &ds.rows[1]);
    assert_eq!(rec2.text, "[source:19人物] 朝代:唐");
}

#[test]
fn load_is_idempotent_and_reads_sources_once() {
    let source = CountingSource::new(vec![people()]);
    let reads = source.reads.clone();
    let cache = CorpusCache::with_datasets(Box::new(source), vec!["19人物".to_string()]);

    assert!(!cache.is_loaded());
    let first = cache.load().to_vec();
    let second = cache.load().to_vec();

    assert!(cache.is_loaded());
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_and_broken_datasets_do_not_stop_the_others() {
    let mut source = CountingSource::new(vec![
        people(),
        Dataset::new("15物产", vec![Row::from_pairs([("物产", CellValue::text("潞绸"))])]),
    ]);
    source.broken.push("17事件".to_string());
    let reads = source.reads.clone();

    let cache = CorpusCache::with_datasets(
        Box::new(source),
        vec![
            "absent".to_string(),
            "17事件".to_string(),
            "19人物".to_string(),
            "15物产".to_string(),
        ],
    );

    let texts: Vec<&str> = cache.load().iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "[source:19人物] 姓名:汤王; 朝代:商; 年份:-1600",
            "[source:19人物] 朝代:唐",
            "[source:15物产] 物产:潞绸",
        ]
    );
    assert_eq!(reads.load(Ordering::SeqCst), 4);
}

#[test]
fn default_cache_targets_the_core_datasets() {
    let cache = CorpusCache::new(Box::new(CountingSource::new(vec![])));
    let names: Vec<&str> = cache.datasets().iter().map(|s| s.as_str()).collect();
    assert_eq!(names, CORPUS_DATASETS.to_vec());
    assert!(cache.load().is_empty());
}

#[test]
fn concurrent_first_loads_share_one_read_pass() {
    let mut source = CountingSource::new(vec![
        people(),
        Dataset::new("15物产", vec![Row::from_pairs([("物产", CellValue::text("潞绸"))])]),
    ]);
    source.read_delay = Duration::from_millis(20);
    let reads = source.reads.clone();
    let datasets = vec!["19人物".to_string(), "15物产".to_string()];
    let cache = CorpusCache::with_datasets(Box::new(source), datasets.clone());

    let seen: Vec<(usize, usize)> = thread::scope(|s| {
        let handles = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let records = cache.load();
                    (records.as_ptr() as usize, records.len())
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().expect("loader thread"))
            .collect()
    });

    assert_eq!(reads.load(Ordering::SeqCst), datasets.len());
    assert!(seen.iter().all(|s| *s == seen[0]));
    assert_eq!(seen[0].1, 3);
}

#[test]
fn source_numbers_keep_their_exact_text() {
    let ds = parse_csv_dataset("t", "编号,年份,人口\n007,1368.0,12345678901234567890\n").expect("parse");
    let row = &ds.rows[0];

    assert_eq!(
        CorpusRecord::from_row("t", row).text,
        "[source:t] 编号:007; 年份:1368.0; 人口:12345678901234567890"
    );
    let persisted = serde_json::to_string(&merge_outcome(row, &RowOutcome::NoText)).expect("serialize");
    assert_eq!(persisted, r#"{"编号":"007","年份":1368.0,"人口":"12345678901234567890"}"#);
}
