//! Parsing of parametric job names.
//!
//! Batch jobs encode parameter values as alternating key/value tokens after a
//! non-numeric prefix: `envelope_loadRatio_10_theta_30` has base name
//! `envelope` and parameters `loadRatio=10`, `theta=30`. The key sequence
//! starts with the token immediately before the first integer token.

use crate::domain::{EvalResult, VerifyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedJobName {
    pub base_name: String,
    pub parameters: Vec<(String, String)>,
}

impl ParsedJobName {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

pub fn parse_job_name(name: &str) -> EvalResult<ParsedJobName> {
    let tokens: Vec<&str> = name.split('_').collect();
    let first_numeric = tokens
        .iter()
        .position(|token| token.parse::<i64>().is_ok())
        .ok_or_else(|| {
            VerifyError::input_validation(
                "JOB.NAME_NUMERIC",
                format!("job name '{name}' carries no numeric parameter token"),
            )
        })?;
    if first_numeric < 2 {
        return Err(VerifyError::input_validation(
            "JOB.NAME_PREFIX",
            format!("job name '{name}' is missing a non-numeric base-name prefix"),
        ));
    }

    let key_start = first_numeric - 1;
    let base_name = tokens[..key_start].join("_");

    let mut parameters = Vec::new();
    let mut cursor = key_start;
    while cursor < tokens.len() {
        let key = tokens[cursor];
        let value = tokens.get(cursor + 1).ok_or_else(|| {
            VerifyError::input_validation(
                "JOB.NAME_PAIRS",
                format!("job name '{name}' parameter '{key}' has no value token"),
            )
        })?;
        parameters.push((key.to_string(), (*value).to_string()));
        cursor += 2;
    }

    Ok(ParsedJobName {
        base_name,
        parameters,
    })
}
