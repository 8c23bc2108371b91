use super::{xy_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult};
use crate::history::HistoryStore;
use crate::job::SlopeTest;
use crate::signal::{combine, differentiate, window_select};

/// Mean derivative of an x-y curve inside a mandatory window.
pub(super) fn evaluate(
    test: &SlopeTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let (x, y) = xy_series(&test.channels, steps, store)?;
    let curve = combine(&x, &y)?;
    scope.publish("curve", &curve);

    let windowed = window_select(&curve, test.window[0], test.window[1])?;
    scope.publish("windowed", &windowed);

    let derivative = differentiate(&windowed)?;
    scope.publish("derivative", &derivative);

    let mean = derivative.iter().map(|point| point[1]).sum::<f64>() / derivative.len() as f64;
    Ok(ComputedValue::Scalar(mean))
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use crate::domain::ComputedValue;
    use crate::evaluators::EvaluationScope;
    use crate::history::InMemoryHistoryStore;
    use crate::identifier::Identifier;
    use crate::job::{SlopeTest, XyChannelTest};

    #[test]
    fn windowed_mean_derivative_recovers_the_stiffness() {
        let mut disp = Vec::new();
        let mut force = Vec::new();
        for index in 0..=20 {
            let t = index as f64 / 20.0;
            disp.push([t, 0.01 * t]);
            force.push([t, 42.0 * 0.01 * t]);
        }
        let archive = serde_json::json!({
            "steps": [
                {
                    "name": "Step-1",
                    "regions": [
                        {
                            "label": "Node PART-1-1.4",
                            "outputs": [
                                { "symbol": "U1", "name": "disp", "data": disp },
                                { "symbol": "RF1", "name": "force", "data": force }
                            ]
                        }
                    ]
                }
            ]
        });
        let store =
            InMemoryHistoryStore::from_json(&archive.to_string()).expect("archive should parse");
        let steps = vec!["Step-1".to_string()];
        let scope = EvaluationScope::new(&store, 0);

        let test = SlopeTest {
            channels: XyChannelTest {
                identifiers: vec![
                    Identifier::Literal("disp".to_string()),
                    Identifier::Literal("force".to_string()),
                ],
                x_expression: None,
                y_expression: None,
            },
            window: [0.0, 0.009],
        };
        let ComputedValue::Scalar(slope) = evaluate(&test, &steps, &store, &scope).unwrap() else {
            panic!("expected a scalar");
        };
        assert!((slope - 42.0).abs() < 1e-9, "slope was {slope}");
    }
}
