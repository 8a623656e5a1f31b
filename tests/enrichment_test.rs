use anyhow::Result;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tempfile::TempDir;
use trail_enrich::core::{ConfigProvider, GeneratorConfigProvider};
use trail_enrich::{
    EnrichmentPipeline, EtlEngine, EtlError, GeneratorPipeline, LocalStorage, TomlConfig,
};

const ROUTING: &str = r#"{
    "111111111111": {
        "account_name": "payments-prod",
        "business_unit": "finance",
        "segment": "enterprise",
        "target_pipeline": "pipeline-a"
    },
    "222222222222": {
        "account_name": "search-dev",
        "business_unit": "platform",
        "segment": "smb",
        "target_pipeline": "pipeline-b"
    },
    "333333333333": {
        "account_name": "unused",
        "business_unit": "platform",
        "segment": "smb",
        "target_pipeline": "pipeline-c"
    }
}"#;

fn write_gzip(path: &Path, text: &str) -> Result<()> {
    let mut encoder = GzEncoder::new(std::fs::File::create(path)?, Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()?;
    Ok(())
}

fn read_gzip_lines(path: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(MultiGzDecoder::new(std::fs::File::open(path)?));
    let mut values = Vec::new();
    for line in reader.lines() {
        values.push(serde_json::from_str(&line?)?);
    }
    Ok(values)
}

fn config(dir: &Path, kind: &str, extra: &str) -> Result<TomlConfig> {
    let content = format!(
        r#"
[pipeline]
name = "integration"
kind = "{kind}"

[routing]
table_path = "{dir}/aws-routing.json"

[enrich]
input_path = "{dir}/test-data.ndjson.gz"
output_path = "{dir}/test-data.rust-output.ndjson.gz"

[generate]
output_path = "{dir}/test-data.ndjson.gz"
{extra}
"#,
        kind = kind,
        dir = dir.to_str().unwrap().replace('\\', "/"),
        extra = extra,
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

#[test]
fn test_concrete_scenario_through_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(
        dir.join("aws-routing.json"),
        r#"{"111111111111": {"target_pipeline": "pipeline-a"}}"#,
    )?;
    write_gzip(
        &dir.join("test-data.ndjson.gz"),
        "{\"recipientAccountId\":\"111111111111\"}\n{\"recipientAccountId\":\"222222222222\"}\n{}\n",
    )?;

    let config = config(dir, "enrich", "")?;
    let output = dir.join("test-data.rust-output.ndjson.gz");
    let report = EtlEngine::new(EnrichmentPipeline::new(LocalStorage::default(), config)).run()?;

    assert_eq!(report.records, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.output_bytes, std::fs::metadata(&output)?.len());

    let lines = read_gzip_lines(&output)?;
    assert_eq!(
        lines,
        vec![
            serde_json::json!({"recipientAccountId": "111111111111", "lookup_target_pipeline": "pipeline-a"}),
            serde_json::json!({"recipientAccountId": "222222222222", "lookup_target_pipeline": "default_gis"}),
            serde_json::json!({"lookup_target_pipeline": "default_gis"}),
        ]
    );
    Ok(())
}

#[test]
fn test_generate_then_enrich() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(dir.join("aws-routing.json"), ROUTING)?;

    let generate_config = config(
        dir,
        "generate",
        "target_size_bytes = 16384\ncheck_interval = 25\naccount_pool_limit = 2\nseed = 7",
    )?;
    let target = generate_config.target_size_bytes();
    let generated_path = dir.join(GeneratorConfigProvider::output_path(&generate_config));

    let generated =
        EtlEngine::new(GeneratorPipeline::new(LocalStorage::default(), generate_config)).run()?;

    assert!(generated.records > 0);
    assert_eq!(generated.records % 25, 0);
    let size = std::fs::metadata(&generated_path)?.len();
    assert!(size >= target, "generated {} bytes, target {}", size, target);

    let enrich_config = config(dir, "enrich", "")?;
    let output_path = dir.join(ConfigProvider::output_path(&enrich_config));
    let enriched =
        EtlEngine::new(EnrichmentPipeline::new(LocalStorage::default(), enrich_config)).run()?;
    assert_eq!(enriched.records, generated.records);

    let input = read_gzip_lines(&generated_path)?;
    let output = read_gzip_lines(&output_path)?;
    assert_eq!(input.len(), output.len());

    for (before, after) in input.iter().zip(output.iter()) {
        let expected = match before["recipientAccountId"].as_str() {
            Some("111111111111") => "pipeline-a",
            Some("222222222222") => "pipeline-b",
            other => panic!("account outside the pool: {:?}", other),
        };
        assert_eq!(after["lookup_target_pipeline"], expected);

        let mut stripped = after.clone();
        stripped
            .as_object_mut()
            .unwrap()
            .remove("lookup_target_pipeline");
        assert_eq!(&stripped, before);
    }
    Ok(())
}

#[test]
fn test_malformed_line_among_valid_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(dir.join("aws-routing.json"), ROUTING)?;

    let mut input = String::new();
    for i in 0..10 {
        if i == 4 {
            input.push_str("{\"recipientAccountId\": \"111111111111\", oops}\n");
        } else {
            input.push_str(&format!(
                "{{\"seq\":{},\"recipientAccountId\":\"222222222222\"}}\n",
                i
            ));
        }
    }
    write_gzip(&dir.join("test-data.ndjson.gz"), &input)?;

    let report = EtlEngine::new(EnrichmentPipeline::new(
        LocalStorage::default(),
        config(dir, "enrich", "")?,
    ))
    .run()?;
    assert_eq!(report.records, 9);
    assert_eq!(report.skipped, 1);

    let lines = read_gzip_lines(&dir.join("test-data.rust-output.ndjson.gz"))?;
    let seqs: Vec<i64> = lines.iter().map(|l| l["seq"].as_i64().unwrap()).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
    assert!(lines
        .iter()
        .all(|l| l["lookup_target_pipeline"] == "pipeline-b"));
    Ok(())
}

#[test]
fn test_malformed_routing_table_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(dir.join("aws-routing.json"), "{\"111111111111\": [")?;
    write_gzip(&dir.join("test-data.ndjson.gz"), "{}\n")?;

    let result = EtlEngine::new(EnrichmentPipeline::new(
        LocalStorage::default(),
        config(dir, "enrich", "")?,
    ))
    .run();

    assert!(matches!(result, Err(EtlError::RoutingTableError { .. })));
    assert!(!dir.join("test-data.rust-output.ndjson.gz").exists());
    Ok(())
}

#[test]
fn test_generator_with_empty_routing_table_fails_without_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    std::fs::write(dir.join("aws-routing.json"), "{}")?;

    let result = EtlEngine::new(GeneratorPipeline::new(
        LocalStorage::default(),
        config(dir, "generate", "")?,
    ))
    .run();

    assert!(result.is_err());
    assert!(!dir.join("test-data.ndjson.gz").exists());
    Ok(())
}
