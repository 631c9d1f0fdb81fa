use sigflow_core::config::entity::{DEFAULT_LOADER, PluginSpec};
use sigflow_core::config::error::ConfigError;
use sigflow_engine::config::load_pipeline_config_with;
use std::io::Write;

fn lookup(name: &str) -> Option<String> {
    match name {
        "FRED_API_KEY" => Some("fred-secret".to_string()),
        "OUT_DIR" => Some("/tmp/sigflow".to_string()),
        _ => None,
    }
}

fn write_yaml(content: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

/// # Summary
/// YAML 配置保持信号顺序，模板变量被替换，未解析的保留原文。
#[test]
fn test_load_yaml_with_templates() -> anyhow::Result<()> {
    let file = write_yaml(
        r#"
signals:
  zeta_signal:
    extractor: coingecko_extractor
    transformer: bitcoin_price_transformer
  m2_money_supply:
    extractor:
      module: sigflow_feed
      class: FredExtractor
      params:
        series_id: M2SL
    transformer: [m2_transformer]
    loaders:
      - console_loader
      - module: sigflow_store
        class: FileLoader
        params:
          file_path: "${OUT_DIR}/m2.json"
    extractor_params:
      api_key: "{{ FRED_API_KEY }}"
      note: "{{UNSET_VARIABLE}}"
  alpha_signal:
    extractor: alternative_extractor
    transformer: fear_greed_transformer
"#,
    )?;

    let cfg = load_pipeline_config_with(file.path(), &lookup)?;
    assert_eq!(
        cfg.signal_names(),
        vec!["zeta_signal", "m2_money_supply", "alpha_signal"]
    );
    assert_eq!(cfg.defaults.loaders, vec![PluginSpec::Name(DEFAULT_LOADER.into())]);

    let m2 = cfg.signal("m2_money_supply").unwrap();
    assert_eq!(m2.extractor.identity(), "sigflow_feed::FredExtractor");
    assert_eq!(m2.extractor_params["api_key"], "fred-secret");
    assert_eq!(m2.extractor_params["note"], "{{UNSET_VARIABLE}}");
    assert_eq!(m2.loaders.len(), 2);
    assert_eq!(m2.loaders[1].params()["file_path"], "/tmp/sigflow/m2.json");
    Ok(())
}

/// # Summary
/// 没有 `signals` 键时，顶层映射即信号表；`defaults` 可覆盖默认加载器。
#[test]
fn test_bare_mapping_and_defaults() -> anyhow::Result<()> {
    let bare = write_yaml(
        r#"
bitcoin_price:
  extractor: coingecko_extractor
  transformer: bitcoin_price_transformer
"#,
    )?;
    let cfg = load_pipeline_config_with(bare.path(), &lookup)?;
    assert_eq!(cfg.signal_names(), vec!["bitcoin_price"]);

    let with_defaults = write_yaml(
        r#"
defaults:
  loaders: [console_loader]
signals:
  bitcoin_price:
    extractor: coingecko_extractor
    transformer: bitcoin_price_transformer
"#,
    )?;
    let cfg = load_pipeline_config_with(with_defaults.path(), &lookup)?;
    assert_eq!(cfg.defaults.loaders, vec![PluginSpec::Name("console_loader".into())]);
    Ok(())
}

/// # Summary
/// 文件不存在、格式错误、结构错误分别报告。
#[test]
fn test_config_errors() -> anyhow::Result<()> {
    let missing = load_pipeline_config_with("/definitely/not/here.yaml", &lookup);
    assert!(matches!(missing, Err(ConfigError::NotFound(_))));

    let malformed = write_yaml("signals: [unclosed\n  - : :")?;
    assert!(matches!(
        load_pipeline_config_with(malformed.path(), &lookup),
        Err(ConfigError::Parse(_))
    ));

    let invalid = write_yaml("signals:\n  broken:\n    transformer: x\n")?;
    assert!(matches!(
        load_pipeline_config_with(invalid.path(), &lookup),
        Err(ConfigError::Invalid(_))
    ));
    Ok(())
}
