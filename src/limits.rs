//! Risk Bands & Credit Limit Policy
//!
//! Post-decision helpers: discretize risk into bands, score account
//! behavior from payment/transaction history, and move a customer's
//! credit limit inside a bounded window. Nothing here feeds back into
//! the classifier; these are serving-side policy utilities.

use serde::{Deserialize, Serialize};

// Factor weights for the behavioral score
const MISSED_PAYMENTS_WEIGHT: f64 = 0.30;
const PAYMENT_HISTORY_WEIGHT: f64 = 0.20;
const TRANSACTION_PATTERNS_WEIGHT: f64 = 0.20;
const CREDIT_UTILIZATION_WEIGHT: f64 = 0.15;
const ACCOUNT_AGE_WEIGHT: f64 = 0.15;

/// How many trailing transactions the pattern analysis looks at
const RECENT_TRANSACTION_WINDOW: usize = 10;

// ============================================================================
// RISK BANDS
// ============================================================================

/// Risk discretization used by limit policy and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    /// Band for a model default probability (higher = worse)
    pub fn from_default_probability(p: f64) -> Self {
        if p < 0.30 {
            RiskBand::Low
        } else if p < 0.50 {
            RiskBand::Medium
        } else if p < 0.70 {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    /// Band for a behavioral account score (higher = better)
    pub fn from_account_score(score: f64) -> Self {
        if score >= 0.7 {
            RiskBand::Low
        } else if score >= 0.5 {
            RiskBand::Medium
        } else if score >= 0.3 {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
            RiskBand::Critical => "critical",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskBand::Low => 0,
            RiskBand::Medium => 1,
            RiskBand::High => 2,
            RiskBand::Critical => 3,
        }
    }

    /// Credit limit multiplier for this band
    pub fn limit_adjustment(&self) -> f64 {
        match self {
            RiskBand::Low => 1.2,      // 20% increase
            RiskBand::Medium => 1.0,   // No change
            RiskBand::High => 0.8,     // 20% decrease
            RiskBand::Critical => 0.5, // 50% decrease
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ACCOUNT BEHAVIOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Missed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub status: PaymentStatus,
    /// Days after the due date the payment landed (zero or negative = on time)
    pub days_late: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub amount: f64,
    pub days_ago: f64,
}

/// Per-factor behavioral scores, each in [0, 1] (1 = clean)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFactors {
    pub missed_payments: f64,
    pub payment_history: f64,
    pub transaction_patterns: f64,
    pub credit_utilization: f64,
    pub account_age: f64,
}

/// Payment and spending history for one account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountActivity {
    pub payments: Vec<PaymentRecord>,
    /// Chronological, oldest first
    pub transactions: Vec<TransactionRecord>,
    pub credit_limit: f64,
}

impl AccountActivity {
    /// Weighted behavioral score in [0, 1], 1 = spotless account
    ///
    /// Accounts without history score neutrally rather than badly: empty
    /// payment/transaction factors count as clean, account age as 0.5.
    pub fn behavior_score(&self) -> f64 {
        let f = self.factor_breakdown();
        let score = f.missed_payments * MISSED_PAYMENTS_WEIGHT
            + f.payment_history * PAYMENT_HISTORY_WEIGHT
            + f.transaction_patterns * TRANSACTION_PATTERNS_WEIGHT
            + f.credit_utilization * CREDIT_UTILIZATION_WEIGHT
            + f.account_age * ACCOUNT_AGE_WEIGHT;
        score.clamp(0.0, 1.0)
    }

    pub fn factor_breakdown(&self) -> BehaviorFactors {
        BehaviorFactors {
            missed_payments: self.missed_payments_score(),
            payment_history: self.payment_history_score(),
            transaction_patterns: self.transaction_patterns_score(),
            credit_utilization: self.credit_utilization_score(),
            account_age: self.account_age_score(),
        }
    }

    fn missed_payments_score(&self) -> f64 {
        if self.payments.is_empty() {
            return 1.0;
        }
        let missed = self
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Missed)
            .count();
        1.0 - missed as f64 / self.payments.len() as f64
    }

    fn payment_history_score(&self) -> f64 {
        if self.payments.is_empty() {
            return 1.0;
        }
        let on_time = self
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed && p.days_late <= 0)
            .count();
        on_time as f64 / self.payments.len() as f64
    }

    fn transaction_patterns_score(&self) -> f64 {
        if self.transactions.is_empty() {
            return 1.0;
        }

        let start = self.transactions.len().saturating_sub(RECENT_TRANSACTION_WINDOW);
        let recent = &self.transactions[start..];

        let average = recent.iter().map(|t| t.amount).sum::<f64>() / recent.len() as f64;
        let max = recent.iter().map(|t| t.amount).fold(f64::MIN, f64::max);
        let min = recent.iter().map(|t| t.amount).fold(f64::MAX, f64::min);

        let volatility_score = if average > 0.0 {
            let volatility = (max - min) / average;
            (1.0 - (volatility - 1.0) / 2.0).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Span back to the oldest transaction in the window
        let days = recent.iter().map(|t| t.days_ago).fold(0.0, f64::max);
        let frequency_score = if days > 0.0 {
            (recent.len() as f64 / days / 2.0).min(1.0)
        } else {
            1.0
        };

        (volatility_score + frequency_score) / 2.0
    }

    fn credit_utilization_score(&self) -> f64 {
        if self.transactions.is_empty() {
            return 1.0;
        }
        let total_spent: f64 = self.transactions.iter().map(|t| t.amount).sum();
        let utilization = if self.credit_limit > 0.0 {
            total_spent / self.credit_limit
        } else {
            f64::INFINITY
        };

        if utilization < 0.3 {
            1.0
        } else if utilization < 0.5 {
            0.8
        } else if utilization < 0.7 {
            0.6
        } else if utilization < 0.9 {
            0.4
        } else {
            0.2
        }
    }

    fn account_age_score(&self) -> f64 {
        if self.transactions.is_empty() {
            return 0.5; // Neutral for brand-new accounts
        }
        let age_years = self.transactions.iter().map(|t| t.days_ago).fold(0.0, f64::max) / 365.0;

        if age_years < 0.5 {
            0.5
        } else if age_years < 1.0 {
            0.7
        } else if age_years < 2.0 {
            0.8
        } else {
            1.0
        }
    }
}

// ============================================================================
// CREDIT LIMIT POLICY
// ============================================================================

/// Bounds for limit movement, as ratios of the initial limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLimitPolicy {
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for CreditLimitPolicy {
    fn default() -> Self {
        Self {
            min_ratio: 0.5, // Never below half the initial limit
            max_ratio: 2.0, // Never above double the initial limit
        }
    }
}

impl CreditLimitPolicy {
    /// New limit after applying the band's adjustment, rounded to whole
    /// currency units and held inside the policy window
    pub fn adjust(&self, current_limit: f64, initial_limit: f64, band: RiskBand) -> f64 {
        let proposed = (current_limit * band.limit_adjustment()).round();
        proposed
            .max(initial_limit * self.min_ratio)
            .min(initial_limit * self.max_ratio)
    }
}

/// Outcome of one account review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitReview {
    pub risk_score: f64,
    pub band: RiskBand,
    pub adjustment: f64,
    pub new_limit: f64,
    pub factors: BehaviorFactors,
}

/// Score the account, band it, and move the limit accordingly
pub fn review_account(
    activity: &AccountActivity,
    initial_limit: f64,
    policy: &CreditLimitPolicy,
) -> LimitReview {
    let risk_score = activity.behavior_score();
    let band = RiskBand::from_account_score(risk_score);
    let new_limit = policy.adjust(activity.credit_limit, initial_limit, band);

    log::debug!(
        "Account review: score={:.2} band={} limit {} -> {}",
        risk_score,
        band,
        activity.credit_limit,
        new_limit
    );

    LimitReview {
        risk_score,
        band,
        adjustment: band.limit_adjustment(),
        new_limit,
        factors: activity.factor_breakdown(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
