//! AWS Lambda handler for schedule simulations
//!
//! Accepts a single commission request as the event payload and returns the
//! computed schedule. Validation failures come back in the `error` field so
//! callers always receive a JSON body.

use commission_engine::schedule::{compute_commission, CommissionEnvelope, CommissionRequest};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

/// Output of one simulation
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommissionEnvelope>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn simulate(request: &CommissionRequest) -> SimulationResponse {
    let start = std::time::Instant::now();

    let (result, error) = match compute_commission(request) {
        Ok(calc) => (Some(calc.envelope()), None),
        Err(e) => {
            log::warn!("{}: {}", request.investment_id, e);
            (None, Some(e.to_string()))
        }
    };

    SimulationResponse {
        result,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error,
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<CommissionRequest>) -> Result<SimulationResponse, Error> {
    let (request, _context) = event.into_parts();
    Ok(simulate(&request))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CommissionRequest {
        CommissionRequest {
            investment_id: "lambda-1".into(),
            principal: dec!(100000),
            deposit_date: "2024-01-06".into(),
            commitment_months: 12,
            liquidity: "Monthly".into(),
            investor_rate: Some(dec!(0.02)),
            advisor_rate: Some(dec!(0.004)),
            office_rate: None,
        }
    }

    #[test]
    fn test_simulate_success() {
        let response = simulate(&request());
        assert!(response.error.is_none());
        let envelope = response.result.unwrap();
        assert_eq!(envelope.payment_due_dates.len(), 13);

        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("paymentDueDates").is_some());
    }

    #[test]
    fn test_simulate_reports_errors() {
        let mut req = request();
        req.deposit_date = "06/01/2024".into();
        let response = simulate(&req);
        assert!(response.result.is_none());
        assert!(response.error.unwrap().contains("deposit_date"));
    }
}
