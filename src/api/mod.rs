use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::{Command, ServerConfig};
use crate::core::brand::render_svg;
use crate::core::gestation::{GestationEstimate, estimate_gestation};
use crate::core::lookup::{LENS_INDICES, Terrain};
use crate::core::{
    CategoryCoefficient, EstimateError, EstimationResult, FormulaInput, LensInput,
    LoadCarriageInput, PresentedResult, SalesTaxInput, TitleInput, VaryingKey, compare_across,
    compare_transactions, comparison_lines, estimate_title_premium, evaluate,
    format_percent_delta, percent_change, present,
};

mod payload;

pub use payload::{
    BrandPayload, FencePayload, GestationPayload, LensPayload, LiquorPayload, RuckPayload,
    SalesTaxPayload, TitlePayload, TreePayload, state_rate,
};

/// Shown in place of a result when a domain guard suppresses computation.
pub const PLACEHOLDER: &str = "n/a";

/// A calculator reachable at `/api/<route>` by GET query string or POST JSON.
pub trait Calculator: DeserializeOwned + Send + 'static {
    const NAME: &'static str;

    fn calculate(self) -> Result<Response, EstimateError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse<'a> {
    pub calculator: &'a str,
    pub result: &'a EstimationResult,
    pub presented: PresentedResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LensComparisonRow {
    pub key: &'static str,
    pub label: &'static str,
    pub refractive_index: f64,
    pub center_mm: f64,
    pub edge_mm: f64,
    pub thickest_mm: f64,
    pub change_vs_standard: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LensComparisonResponse {
    calculator: &'static str,
    rows: Vec<LensComparisonRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GestationResponse {
    calculator: &'static str,
    #[serde(flatten)]
    estimate: GestationEstimate,
    summary: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<&'static str>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl Calculator for TitlePayload {
    const NAME: &'static str = "title-insurance";

    fn calculate(self) -> Result<Response, EstimateError> {
        let input = self.into_input();
        let mut result = estimate_title_premium(&input)?;
        result.comparisons = compare_transactions(input.purchase_price, input.enhanced);
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for RuckPayload {
    const NAME: &'static str = "rucking";

    fn calculate(self) -> Result<Response, EstimateError> {
        let compare = self.compare();
        let input = self.into_input()?;
        let result = evaluate_with_comparison(
            &input,
            compare.then_some((VaryingKey::TerrainFactor, RuckPayload::candidates())),
        )?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for LensPayload {
    const NAME: &'static str = "lens";

    fn calculate(self) -> Result<Response, EstimateError> {
        let result = evaluate(&self.into_input())?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

/// `/api/lens/compare`: the same prescription across every lens index.
struct LensCompare(LensPayload);

impl<'de> serde::Deserialize<'de> for LensCompare {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LensPayload::deserialize(deserializer).map(LensCompare)
    }
}

impl Calculator for LensCompare {
    const NAME: &'static str = "lens-compare";

    fn calculate(self) -> Result<Response, EstimateError> {
        let rows = lens_comparison(&self.0.into_input())?;
        Ok(json_response(
            StatusCode::OK,
            LensComparisonResponse {
                calculator: Self::NAME,
                rows,
            },
        ))
    }
}

impl Calculator for FencePayload {
    const NAME: &'static str = "fence";

    fn calculate(self) -> Result<Response, EstimateError> {
        let compare = self.compare();
        let input = self.into_input();
        let result = evaluate_with_comparison(
            &input,
            compare.then_some((VaryingKey::MaterialPrice, FencePayload::candidates())),
        )?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for SalesTaxPayload {
    const NAME: &'static str = "sales-tax";

    fn calculate(self) -> Result<Response, EstimateError> {
        let compare = self.compare();
        let input = self.into_input();
        let result = evaluate_with_comparison(
            &input,
            compare.then_some((VaryingKey::TaxRate, SalesTaxPayload::candidates())),
        )?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for TreePayload {
    const NAME: &'static str = "tree-removal";

    fn calculate(self) -> Result<Response, EstimateError> {
        let result = evaluate(&self.into_input())?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for LiquorPayload {
    const NAME: &'static str = "liquor";

    fn calculate(self) -> Result<Response, EstimateError> {
        let result = evaluate(&self.into_input())?;
        Ok(estimate_response(Self::NAME, &result))
    }
}

impl Calculator for GestationPayload {
    const NAME: &'static str = "gestation";

    fn calculate(self) -> Result<Response, EstimateError> {
        let (lmp, cycle_days, reference) = self.dates()?;
        let estimate = estimate_gestation(lmp, cycle_days, reference)?;
        let summary = format!(
            "{} weeks, {} days (trimester {}), due {}",
            estimate.gestational_age.weeks,
            estimate.gestational_age.days,
            estimate.trimester,
            estimate.due_date
        );
        Ok(json_response(
            StatusCode::OK,
            GestationResponse {
                calculator: Self::NAME,
                estimate,
                summary,
            },
        ))
    }
}

impl Calculator for BrandPayload {
    const NAME: &'static str = "brand";

    fn calculate(self) -> Result<Response, EstimateError> {
        let svg = render_svg(&self.into_spec())?;
        let mut response = with_cache_control((StatusCode::OK, svg));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            "image/svg+xml".parse().expect("valid header"),
        );
        response.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            "inline; filename=\"brand.svg\"".parse().expect("valid header"),
        );
        Ok(response)
    }
}

fn evaluate_with_comparison(
    input: &FormulaInput,
    comparison: Option<(VaryingKey, &[CategoryCoefficient])>,
) -> Result<EstimationResult, EstimateError> {
    let mut result = evaluate(input)?;
    if let Some((key, candidates)) = comparison {
        let runs = compare_across(input, key, candidates)?;
        result.comparisons = comparison_lines(candidates, &runs);
    }
    Ok(result)
}

/// One row per lens index, with the thickest point's change against the
/// first (standard plastic) row.
pub fn lens_comparison(input: &FormulaInput) -> Result<Vec<LensComparisonRow>, EstimateError> {
    let runs = compare_across(input, VaryingKey::RefractiveIndex, LENS_INDICES)?;
    let thickest = |result: &EstimationResult| {
        let center = result.derived_value("Center thickness").unwrap_or(0.0);
        let edge = result.derived_value("Edge thickness").unwrap_or(0.0);
        center.max(edge)
    };
    let standard = runs.first().map(thickest).unwrap_or(0.0);

    Ok(LENS_INDICES
        .iter()
        .zip(&runs)
        .map(|(row, result)| LensComparisonRow {
            key: row.key,
            label: row.label,
            refractive_index: row.coefficient,
            center_mm: result.derived_value("Center thickness").unwrap_or(0.0),
            edge_mm: result.derived_value("Edge thickness").unwrap_or(0.0),
            thickest_mm: thickest(result),
            change_vs_standard: format_percent_delta(percent_change(standard, thickest(result))),
        })
        .collect())
}

fn calculator_route<C: Calculator>() -> MethodRouter {
    get(get_handler::<C>).post(post_handler::<C>)
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/title-insurance", calculator_route::<TitlePayload>())
        .route("/api/rucking", calculator_route::<RuckPayload>())
        .route("/api/lens", calculator_route::<LensPayload>())
        .route("/api/lens/compare", calculator_route::<LensCompare>())
        .route("/api/fence", calculator_route::<FencePayload>())
        .route("/api/sales-tax", calculator_route::<SalesTaxPayload>())
        .route("/api/tree-removal", calculator_route::<TreePayload>())
        .route("/api/liquor", calculator_route::<LiquorPayload>())
        .route("/api/gestation", calculator_route::<GestationPayload>())
        .route("/api/brand", calculator_route::<BrandPayload>())
        .fallback(not_found_handler)
}

pub async fn run_http_server(config: &ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "estimator HTTP API listening");
    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn get_handler<C: Calculator>(query: Result<Query<C>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => handle_calculator(payload),
        Err(rejection) => rejected_payload(C::NAME, &rejection.body_text()),
    }
}

async fn post_handler<C: Calculator>(body: Result<Json<C>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => handle_calculator(payload),
        Err(rejection) => rejected_payload(C::NAME, &rejection.body_text()),
    }
}

fn rejected_payload(calculator: &str, reason: &str) -> Response {
    warn!(calculator, reason, "payload rejected");
    error_response(StatusCode::BAD_REQUEST, reason)
}

fn handle_calculator<C: Calculator>(payload: C) -> Response {
    debug!(calculator = C::NAME, "estimate requested");
    match payload.calculate() {
        Ok(response) => response,
        Err(e) => estimate_error_response(C::NAME, &e),
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn estimate_error_response(calculator: &str, err: &EstimateError) -> Response {
    warn!(calculator, error = %err, "estimate rejected");
    if err.is_domain_guard() {
        json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse {
                error: err.to_string(),
                placeholder: Some(PLACEHOLDER),
            },
        )
    } else {
        error_response(StatusCode::BAD_REQUEST, &err.to_string())
    }
}

fn estimate_response(calculator: &str, result: &EstimationResult) -> Response {
    json_response(
        StatusCode::OK,
        EstimateResponse {
            calculator,
            result,
            presented: present(result),
        },
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            placeholder: None,
        },
    )
}

/// Runs a one-shot CLI subcommand and returns what should be printed.
pub fn run_command(command: Command, json: bool) -> Result<String, String> {
    let (title, result) = match command {
        Command::Serve(_) => return Err("serve does not produce a one-shot estimate".to_string()),
        Command::Title {
            price,
            transaction,
            enhanced,
        } => {
            let input = TitleInput {
                purchase_price: price,
                kind: transaction.into(),
                enhanced,
            };
            let mut result = estimate_title_premium(&input).map_err(|e| e.to_string())?;
            result.comparisons = compare_transactions(price, enhanced);
            ("Title insurance premium", result)
        }
        Command::Ruck {
            body_weight,
            load,
            pace,
            grade,
            terrain,
            duration,
        } => {
            let input = LoadCarriageInput::from_imperial(
                body_weight,
                load,
                pace,
                grade,
                Terrain::from(terrain).coefficient(),
                duration,
            )
            .map_err(|e| e.to_string())?;
            let result =
                evaluate(&FormulaInput::LoadCarriage(input)).map_err(|e| e.to_string())?;
            ("Calories burned rucking", result)
        }
        Command::Lens {
            power,
            index,
            lens_width,
            frame_pd,
            pd,
            compare,
        } => {
            let input = FormulaInput::LensThickness(LensInput {
                power_diopters: power,
                refractive_index: index,
                lens_width_mm: lens_width,
                frame_pd_mm: frame_pd,
                pupillary_distance_mm: pd,
            });
            if compare {
                let rows = lens_comparison(&input).map_err(|e| e.to_string())?;
                return render_lens_rows(&rows, json);
            }
            let result = evaluate(&input).map_err(|e| e.to_string())?;
            ("Lens thickness", result)
        }
        Command::SalesTax { total, rate, state } => {
            let rate_percent = match (rate, state.as_deref()) {
                (Some(rate), _) => rate,
                (None, Some(code)) => state_rate(code),
                (None, None) => return Err("--rate or --state is required".to_string()),
            };
            let input = FormulaInput::ReverseSalesTax(SalesTaxInput {
                total_price: total,
                rate_percent,
            });
            let result = evaluate(&input).map_err(|e| e.to_string())?;
            ("Reverse sales tax", result)
        }
    };

    if json {
        let response = EstimateResponse {
            calculator: title,
            result: &result,
            presented: present(&result),
        };
        return serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize result: {e}"));
    }
    Ok(render_text(title, &present(&result)))
}

fn render_text(title: &str, presented: &PresentedResult) -> String {
    let mut out = format!("{title}: {}\n", presented.headline);
    for line in &presented.breakdown {
        out.push_str(&format!("  {:<32} {}\n", line.label, line.text));
    }
    for line in &presented.derived {
        out.push_str(&format!("  {:<32} {}\n", line.label, line.text));
    }
    if !presented.comparisons.is_empty() {
        out.push_str("Comparison:\n");
        for line in &presented.comparisons {
            out.push_str(&format!("  {:<32} {}\n", line.label, line.text));
        }
    }
    out
}

fn render_lens_rows(rows: &[LensComparisonRow], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(rows)
            .map_err(|e| format!("Failed to serialize result: {e}"));
    }
    let mut out = format!(
        "{:<20} {:>6} {:>10} {:>10} {:>8}\n",
        "Material", "Index", "Center mm", "Edge mm", "Change"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<20} {:>6.2} {:>10.1} {:>10.1} {:>8}\n",
            row.label, row.refractive_index, row.center_mm, row.edge_mm, row.change_vs_standard
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliTerrain, CliTransactionKind};

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_lens() -> FormulaInput {
        FormulaInput::LensThickness(LensInput {
            power_diopters: -4.0,
            refractive_index: 1.5,
            lens_width_mm: 52.0,
            frame_pd_mm: 70.0,
            pupillary_distance_mm: 64.0,
        })
    }

    #[test]
    fn lens_comparison_covers_every_index_and_thins_out() {
        let rows = lens_comparison(&sample_lens()).expect("valid lens");
        assert_eq!(rows.len(), LENS_INDICES.len());
        assert_eq!(rows[0].change_vs_standard, "0.0%");
        assert_approx(rows[0].edge_mm, 4.864, 1e-3);
        for pair in rows.windows(2) {
            assert!(pair[1].thickest_mm < pair[0].thickest_mm);
        }
        assert!(rows.last().map(|r| r.change_vs_standard.starts_with('-')).unwrap_or(false));
    }

    #[test]
    fn lens_comparison_rejects_non_lens_inputs() {
        let input = FormulaInput::ReverseSalesTax(SalesTaxInput {
            total_price: 100.0,
            rate_percent: 5.0,
        });
        assert!(matches!(
            lens_comparison(&input),
            Err(EstimateError::UnsupportedVaryingKey { .. })
        ));
    }

    #[test]
    fn comparison_is_attached_only_when_requested() {
        let input = FormulaInput::ReverseSalesTax(SalesTaxInput {
            total_price: 107.5,
            rate_percent: 7.5,
        });
        let plain = evaluate_with_comparison(&input, None).expect("valid input");
        assert!(plain.comparisons.is_empty());

        let compared = evaluate_with_comparison(
            &input,
            Some((VaryingKey::TaxRate, SalesTaxPayload::candidates())),
        )
        .expect("valid input");
        assert_eq!(compared.comparisons.len(), SalesTaxPayload::candidates().len());
    }

    #[test]
    fn title_command_prints_headline_and_breakdown() {
        let out = run_command(
            Command::Title {
                price: 300_000.0,
                transaction: CliTransactionKind::Sale,
                enhanced: false,
            },
            false,
        )
        .expect("valid command");
        assert!(out.starts_with("Title insurance premium: $2,071"), "{out}");
        assert!(out.contains("Base premium"));
        assert!(out.contains("Comparison:"));
    }

    #[test]
    fn ruck_command_json_contains_primary_calories() {
        let out = run_command(
            Command::Ruck {
                body_weight: 180.0,
                load: 35.0,
                pace: 15.0,
                grade: 0.0,
                terrain: CliTerrain::Paved,
                duration: 60.0,
            },
            true,
        )
        .expect("valid command");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json output");
        let kcal = value["result"]["primary"]["value"]
            .as_f64()
            .expect("numeric primary");
        assert_approx(kcal, 543.778, 0.01);
    }

    #[test]
    fn ruck_command_reports_domain_guard() {
        let err = run_command(
            Command::Ruck {
                body_weight: 0.0,
                load: 35.0,
                pace: 15.0,
                grade: 0.0,
                terrain: CliTerrain::Paved,
                duration: 60.0,
            },
            false,
        )
        .expect_err("zero body weight");
        assert!(err.contains("body weight"), "{err}");
    }

    #[test]
    fn sales_tax_command_needs_a_rate_source() {
        let err = run_command(
            Command::SalesTax {
                total: 107.5,
                rate: None,
                state: None,
            },
            false,
        )
        .expect_err("no rate");
        assert!(err.contains("--rate"));

        let out = run_command(
            Command::SalesTax {
                total: 107.5,
                rate: Some(7.5),
                state: None,
            },
            false,
        )
        .expect("valid command");
        assert!(out.contains("$100.00"), "{out}");
    }

    #[test]
    fn lens_compare_command_prints_a_table() {
        let out = run_command(
            Command::Lens {
                power: -4.0,
                index: 1.5,
                lens_width: 52.0,
                frame_pd: 70.0,
                pd: 64.0,
                compare: true,
            },
            false,
        )
        .expect("valid command");
        assert_eq!(out.lines().count(), LENS_INDICES.len() + 1);
        assert!(out.contains("High-index 1.74"));
    }

    #[test]
    fn serve_is_not_a_one_shot_command() {
        assert!(run_command(Command::Serve(ServerConfig::default()), false).is_err());
    }
}
