use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// FinancialStatus
///
/// Fee-payment state of a student. One of the three classifier inputs;
/// serialized as the literal strings "Paid" / "Unpaid" on the wire and in
/// the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
pub enum FinancialStatus {
    #[default]
    Paid,
    Unpaid,
}

/// RiskLevel
///
/// The derived three-level drop-out risk label. This is never set directly:
/// every write that touches a classifier input recomputes it via
/// [`classify`] before persisting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
pub enum RiskLevel {
    #[default]
    #[serde(rename = "Low Risk")]
    #[sqlx(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    #[sqlx(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    #[sqlx(rename = "High Risk")]
    High,
}

/// classify
///
/// Deterministic, side-effect-free mapping from the three tracked signals to
/// a risk label. Each failing threshold contributes one point:
/// attendance below 80, grade below 60, unpaid fees. Three points is
/// "High Risk", two is "Medium Risk", anything less is "Low Risk".
///
/// Risk is monotonically non-decreasing as attendance drops, the grade
/// drops, or the financial status moves Paid -> Unpaid.
pub fn classify(attendance: f64, grade: f64, financial: FinancialStatus) -> RiskLevel {
    let mut risk_score = 0;
    if attendance < 80.0 {
        risk_score += 1;
    }
    if grade < 60.0 {
        risk_score += 1;
    }
    if financial == FinancialStatus::Unpaid {
        risk_score += 1;
    }

    if risk_score >= 3 {
        RiskLevel::High
    } else if risk_score == 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
