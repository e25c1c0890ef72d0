use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use spider_web_core::config::WebConfig;
use spider_web_core::engine::Engine;

/// Minimal PyO3 module exposing spider-web-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&WebConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    parse_config(config_json)
        .map(|_| true)
        .map_err(PyValueError::new_err)
}

/// Evolve a web for `generations` cycles and return the run summary as JSON.
#[pyfunction]
#[pyo3(signature = (config_json, generations, sample_every=1))]
fn evolve_json(config_json: &str, generations: usize, sample_every: usize) -> PyResult<String> {
    evolve(config_json, generations, sample_every).map_err(PyValueError::new_err)
}

fn parse_config(config_json: &str) -> Result<WebConfig, String> {
    let config: WebConfig =
        serde_json::from_str(config_json).map_err(|e| format!("invalid config json: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("invalid web configuration: {e}"))?;
    Ok(config)
}

fn evolve(config_json: &str, generations: usize, sample_every: usize) -> Result<String, String> {
    let config = parse_config(config_json)?;
    let mut engine = Engine::new(config).map_err(|e| format!("failed to spin web: {e}"))?;
    let summary = engine
        .run(generations, sample_every)
        .map_err(|e| format!("evolution failed: {e}"))?;
    serde_json::to_string(&summary).map_err(|e| format!("failed to serialize summary: {e}"))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(evolve_json, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_rejects_out_of_range_sides() {
        let err = parse_config(r#"{"sides_count": 30}"#).expect_err("30 sides is invalid");
        assert!(err.contains("sides count"), "{err}");
    }

    #[test]
    fn parse_config_rejects_malformed_json() {
        let err = parse_config("{").expect_err("truncated json");
        assert!(err.starts_with("invalid config json"));
    }

    #[test]
    fn evolve_returns_summary_json() {
        let json = evolve(r#"{"seed": 3, "prey_count": 50}"#, 5, 5).expect("evolve");
        let summary: spider_web_core::RunSummary =
            serde_json::from_str(&json).expect("summary should parse");
        assert_eq!(summary.generations, 5);
        assert_eq!(summary.final_status.generation, 6);
        assert_eq!(summary.final_status.prey_count, 50);
    }

    #[test]
    fn evolve_rejects_zero_sample_every() {
        assert!(evolve("{}", 5, 0).is_err());
    }
}
