//! Job configuration: an ordered sequence of test specifications plus
//! run-gating flags.
//!
//! Each specification keeps its raw ordered JSON mapping (the results
//! artifact must round-trip it untouched) alongside a typed [`TestKind`]
//! decided once here, so evaluators never re-check field presence.

use crate::domain::{EvalResult, VerifyError};
use crate::identifier::Identifier;
use serde::Deserialize;
use serde_json::{Map, Value};

pub type RawMapping = Map<String, Value>;

pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub ignore_analysis_errors: bool,
    /// `Some(false)` makes warnings fatal; absent or `Some(true)` tolerates
    /// them, matching the legacy default.
    pub ignore_warnings: Option<bool>,
    pub specifications: Vec<TestSpecification>,
}

impl JobConfig {
    pub fn from_json(source: &str) -> EvalResult<Self> {
        let raw: RawJobConfig = serde_json::from_str(source).map_err(|source| {
            VerifyError::input_validation(
                "JOB.CONFIG_PARSE",
                format!("failed to parse job configuration: {source}"),
            )
        })?;

        let specifications = raw
            .results
            .iter()
            .enumerate()
            .map(|(index, value)| TestSpecification::from_value(index, value))
            .collect::<EvalResult<Vec<_>>>()?;

        Ok(Self {
            ignore_analysis_errors: raw.ignore_analysis_errors.unwrap_or(false),
            ignore_warnings: raw.ignore_warnings,
            specifications,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJobConfig {
    #[serde(default)]
    ignore_analysis_errors: Option<bool>,
    #[serde(default)]
    ignore_warnings: Option<bool>,
    results: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct TestSpecification {
    pub index: usize,
    pub raw: RawMapping,
    pub kind: TestKind,
    pub step: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TestKind {
    Max(SingleChannelTest),
    Min(SingleChannelTest),
    Continuous(ContinuityTest),
    FinalValue(SingleChannelTest),
    XyInflectionPoint(InflectionTest),
    DispAtZeroY(ZeroCrossingTest),
    Slope(SlopeTest),
    XAtPeakInXy(XyChannelTest),
    Tabular(TabularTest),
    LogStressAtFailureInit(FailureEnvelopeTest),
}

impl TestKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Max(_) => "max",
            Self::Min(_) => "min",
            Self::Continuous(_) => "continuous",
            Self::FinalValue(_) => "finalValue",
            Self::XyInflectionPoint(_) => "xy_infl_pt",
            Self::DispAtZeroY(_) => "disp_at_zero_y",
            Self::Slope(_) => "slope",
            Self::XAtPeakInXy(_) => "x_at_peak_in_xy",
            Self::Tabular(_) => "tabular",
            Self::LogStressAtFailureInit(_) => "log_stress_at_failure_init",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SingleChannelTest {
    pub identifier: Identifier,
    pub expression: Option<SeriesExpr>,
}

#[derive(Debug, Clone)]
pub struct ContinuityTest {
    pub identifier: Identifier,
    pub expression: Option<SeriesExpr>,
    pub reference_value: f64,
}

#[derive(Debug, Clone)]
pub struct XyChannelTest {
    pub identifiers: Vec<Identifier>,
    pub x_expression: Option<SeriesExpr>,
    pub y_expression: Option<SeriesExpr>,
}

#[derive(Debug, Clone)]
pub struct InflectionTest {
    pub channels: XyChannelTest,
    pub window: [f64; 2],
    pub filter_cutoff_frequency: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SlopeTest {
    pub channels: XyChannelTest,
    pub window: [f64; 2],
}

#[derive(Debug, Clone)]
pub struct ZeroCrossingTest {
    pub channels: XyChannelTest,
    pub window: Option<[f64; 2]>,
    pub reference_value: f64,
    pub tolerance: f64,
    pub zero_tolerance: f64,
}

#[derive(Debug, Clone)]
pub struct TabularTest {
    pub channels: XyChannelTest,
    pub reference_points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone)]
pub struct FailureEnvelopeTest {
    pub failure_indices: Vec<Identifier>,
    pub stress_components: Vec<Identifier>,
    pub additional_identifiers: Vec<Identifier>,
}

/// Closed combinator set replacing the legacy free-form evaluation
/// statements: a named operation over two labeled series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesExpr {
    pub op: SeriesOp,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesOp {
    Difference,
    Sum,
    Ratio,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTestSpecification {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    identifier: Option<Identifier>,
    #[serde(default)]
    reference_value: Option<Value>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    step: Option<String>,
    #[serde(default)]
    window: Option<[f64; 2]>,
    #[serde(default)]
    zero_tol: Option<f64>,
    #[serde(default)]
    filter_cutoff_frequency: Option<f64>,
    #[serde(default)]
    failure_indices: Option<Vec<Identifier>>,
    #[serde(default)]
    stress_components: Option<Vec<Identifier>>,
    #[serde(default)]
    additional_identifiers_to_store: Option<Vec<Identifier>>,
    #[serde(default)]
    expression: Option<SeriesExpr>,
    #[serde(default)]
    x_expression: Option<SeriesExpr>,
    #[serde(default)]
    y_expression: Option<SeriesExpr>,
}

impl TestSpecification {
    pub fn from_value(index: usize, value: &Value) -> EvalResult<Self> {
        let Value::Object(raw_map) = value else {
            return Err(VerifyError::input_validation(
                "TEST.SPEC_SHAPE",
                format!("test specification {index} must be a mapping"),
            ));
        };

        let raw: RawTestSpecification =
            serde_json::from_value(value.clone()).map_err(|source| {
                VerifyError::input_validation(
                    "TEST.SPEC_PARSE",
                    format!("test specification {index} is malformed: {source}"),
                )
            })?;

        let kind = match raw.kind.as_str() {
            "max" => TestKind::Max(single_channel(index, &raw)?),
            "min" => TestKind::Min(single_channel(index, &raw)?),
            "finalValue" => TestKind::FinalValue(single_channel(index, &raw)?),
            "continuous" => TestKind::Continuous(ContinuityTest {
                reference_value: scalar_reference(index, &raw)?,
                identifier: require_identifier(index, &raw)?,
                expression: raw.expression.clone(),
            }),
            "xy_infl_pt" => TestKind::XyInflectionPoint(InflectionTest {
                channels: xy_channels(index, &raw)?,
                window: require_window(index, &raw)?,
                filter_cutoff_frequency: raw.filter_cutoff_frequency,
            }),
            "disp_at_zero_y" => {
                let window = raw.window;
                let (reference_value, tolerance) = if window.is_none() {
                    (
                        scalar_reference(index, &raw)?,
                        raw.tolerance.ok_or_else(|| {
                            VerifyError::input_validation(
                                "TEST.TOLERANCE",
                                format!(
                                    "test specification {index} needs a tolerance when no window is given"
                                ),
                            )
                        })?,
                    )
                } else {
                    (
                        scalar_reference(index, &raw).unwrap_or(0.0),
                        raw.tolerance.unwrap_or(0.0),
                    )
                };
                TestKind::DispAtZeroY(ZeroCrossingTest {
                    channels: xy_channels(index, &raw)?,
                    window,
                    reference_value,
                    tolerance,
                    zero_tolerance: raw.zero_tol.unwrap_or(DEFAULT_ZERO_TOLERANCE),
                })
            }
            "slope" => TestKind::Slope(SlopeTest {
                channels: xy_channels(index, &raw)?,
                window: require_window(index, &raw)?,
            }),
            "x_at_peak_in_xy" => TestKind::XAtPeakInXy(xy_channels(index, &raw)?),
            "tabular" => TestKind::Tabular(TabularTest {
                channels: xy_channels(index, &raw)?,
                reference_points: pair_reference(index, &raw)?,
            }),
            "log_stress_at_failure_init" => {
                let failure_indices = raw.failure_indices.clone().ok_or_else(|| {
                    VerifyError::input_validation(
                        "TEST.FAILURE_INDICES",
                        format!("test specification {index} is missing failureIndices"),
                    )
                })?;
                if failure_indices.is_empty() {
                    return Err(VerifyError::input_validation(
                        "TEST.FAILURE_INDICES",
                        format!("test specification {index} has an empty failureIndices list"),
                    ));
                }
                let stress_components = raw.stress_components.clone().ok_or_else(|| {
                    VerifyError::input_validation(
                        "TEST.STRESS_COMPONENTS",
                        format!("test specification {index} is missing stressComponents"),
                    )
                })?;
                TestKind::LogStressAtFailureInit(FailureEnvelopeTest {
                    failure_indices,
                    stress_components,
                    additional_identifiers: raw
                        .additional_identifiers_to_store
                        .clone()
                        .unwrap_or_default(),
                })
            }
            other => {
                return Err(VerifyError::unrecognized_test_type(
                    "TEST.TYPE",
                    format!("test specification {index} has unrecognized type '{other}'"),
                ));
            }
        };

        Ok(Self {
            index,
            raw: raw_map.clone(),
            kind,
            step: raw.step,
        })
    }
}

fn require_identifier(index: usize, raw: &RawTestSpecification) -> EvalResult<Identifier> {
    raw.identifier.clone().ok_or_else(|| {
        VerifyError::malformed_identifier(
            "TEST.IDENTIFIER",
            format!("test specification {index} is missing its identifier"),
        )
    })
}

fn single_channel(index: usize, raw: &RawTestSpecification) -> EvalResult<SingleChannelTest> {
    Ok(SingleChannelTest {
        identifier: require_identifier(index, raw)?,
        expression: raw.expression.clone(),
    })
}

fn xy_channels(index: usize, raw: &RawTestSpecification) -> EvalResult<XyChannelTest> {
    let identifiers = match require_identifier(index, raw)? {
        Identifier::Sequence(identifiers) if identifiers.len() >= 2 => identifiers,
        _ => {
            return Err(VerifyError::malformed_identifier(
                "TEST.XY_IDENTIFIERS",
                format!("test specification {index} needs a sequence of at least two identifiers"),
            ));
        }
    };

    if raw.x_expression.is_some() != raw.y_expression.is_some() {
        return Err(VerifyError::input_validation(
            "TEST.EXPRESSION_PAIR",
            format!("test specification {index} must supply both xExpression and yExpression"),
        ));
    }

    Ok(XyChannelTest {
        identifiers,
        x_expression: raw.x_expression.clone(),
        y_expression: raw.y_expression.clone(),
    })
}

fn require_window(index: usize, raw: &RawTestSpecification) -> EvalResult<[f64; 2]> {
    raw.window.ok_or_else(|| {
        VerifyError::input_validation(
            "TEST.WINDOW",
            format!("test specification {index} requires a window"),
        )
    })
}

fn scalar_reference(index: usize, raw: &RawTestSpecification) -> EvalResult<f64> {
    raw.reference_value
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            VerifyError::input_validation(
                "TEST.REFERENCE",
                format!("test specification {index} needs a numeric referenceValue"),
            )
        })
}

fn pair_reference(index: usize, raw: &RawTestSpecification) -> EvalResult<Vec<[f64; 2]>> {
    let value = raw.reference_value.clone().ok_or_else(|| {
        VerifyError::input_validation(
            "TEST.REFERENCE",
            format!("test specification {index} needs a referenceValue list of [x, y] pairs"),
        )
    })?;
    serde_json::from_value(value).map_err(|source| {
        VerifyError::input_validation(
            "TEST.REFERENCE",
            format!("test specification {index} referenceValue must be [x, y] pairs: {source}"),
        )
    })
}
